//! Connection string parsing.
//!
//! Pure functions only; no I/O, no async, no filesystem access.

use std::fmt;

use crate::domain::error::ConnectionStringError;

const SERVER_KEYS: &[&str] = &["server", "data source", "address", "addr", "network address"];
const DATABASE_KEYS: &[&str] = &["initial catalog", "database"];
const USER_KEYS: &[&str] = &["user id", "uid", "user"];
const PASSWORD_KEYS: &[&str] = &["password", "pwd"];

/// Fields extracted from an ADO.NET-style SQL Server connection string.
///
/// `Debug` redacts the password so the descriptor can be traced safely.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    /// Server host without protocol prefix or port.
    pub host: String,
    /// Explicit TCP port, if the connection string carried one.
    pub port: Option<u16>,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl ConnectionDescriptor {
    /// Parse a raw connection string such as
    /// `Server=tcp:srv.database.windows.net,1433;Initial Catalog=db;User Id=u;Password=p;`.
    ///
    /// Keys are matched case-insensitively. Values may be wrapped in single or
    /// double quotes, with a doubled quote standing for a literal one.
    ///
    /// # Errors
    ///
    /// Returns an error if a segment is malformed or a required key is missing.
    pub fn parse(raw: &str) -> Result<Self, ConnectionStringError> {
        let pairs = split_pairs(raw)?;
        let lookup = |keys: &[&str], name: &'static str| {
            pairs
                .iter()
                .rev()
                .find(|(k, v)| keys.contains(&k.as_str()) && !v.is_empty())
                .map(|(_, v)| v.clone())
                .ok_or(ConnectionStringError::MissingKey(name))
        };

        let server = lookup(SERVER_KEYS, "Server")?;
        let (host, port) = split_server(&server)?;

        Ok(Self {
            host,
            port,
            database: lookup(DATABASE_KEYS, "Initial Catalog")?,
            user: lookup(USER_KEYS, "User Id")?,
            password: lookup(PASSWORD_KEYS, "Password")?,
        })
    }

    /// Server argument in the `host[,port]` form `sqlcmd -S` expects.
    #[must_use]
    pub fn sqlcmd_server(&self) -> String {
        match self.port {
            Some(port) => format!("{},{port}", self.host),
            None => self.host.clone(),
        }
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Split `tcp:host, 1433` into `("host", Some(1433))`.
fn split_server(server: &str) -> Result<(String, Option<u16>), ConnectionStringError> {
    let server = server.trim();
    let server = match server.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("tcp:") => &server[4..],
        _ => server,
    };

    match server.split_once(',') {
        Some((host, port)) => {
            let port = port.trim();
            let port = port
                .parse::<u16>()
                .map_err(|_| ConnectionStringError::InvalidPort(port.to_owned()))?;
            Ok((host.trim().to_owned(), Some(port)))
        }
        None => Ok((server.to_owned(), None)),
    }
}

/// Tokenize `key=value;` segments into lowercased keys and unquoted values.
fn split_pairs(raw: &str) -> Result<Vec<(String, String)>, ConnectionStringError> {
    let mut pairs = Vec::new();
    let mut rest = raw;

    loop {
        rest = rest.trim_start_matches(|c: char| c == ';' || c.is_whitespace());
        if rest.is_empty() {
            return Ok(pairs);
        }

        let segment_end = rest.find(';').unwrap_or(rest.len());
        let Some(eq) = rest[..segment_end].find('=') else {
            return Err(ConnectionStringError::MalformedSegment(
                rest[..segment_end].trim().to_owned(),
            ));
        };

        let key = rest[..eq].trim().to_ascii_lowercase();
        let after = rest[eq + 1..].trim_start();

        let (value, remainder) = match after.chars().next() {
            Some(quote @ ('\'' | '"')) => read_quoted(&after[1..], quote)
                .ok_or_else(|| ConnectionStringError::UnterminatedQuote(key.clone()))?,
            _ => match after.find(';') {
                Some(i) => (after[..i].trim_end().to_owned(), &after[i..]),
                None => (after.trim_end().to_owned(), ""),
            },
        };

        pairs.push((key, value));
        rest = remainder;
    }
}

fn read_quoted(s: &str, quote: char) -> Option<(String, &str)> {
    let mut value = String::new();
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == quote {
            if chars.peek().map(|&(_, next)| next) == Some(quote) {
                value.push(quote);
                chars.next();
                continue;
            }
            return Some((value, &s[i + c.len_utf8()..]));
        }
        value.push(c);
    }
    None
}

//! Connection strings handed to the MySQL driver.
//!
//! A DSN is what remains of a `mysql://` URL once the scheme is stripped:
//!
//! ```text
//! [user[:password]@][address][/database][?param=value&...]
//! ```
//!
//! `address` is `host`, `host:port`, `[ipv6]:port`, `tcp(host)` or
//! `unix(/path/to/socket)`; an empty address means `localhost:3306`.
//! Reserved characters in the user, password and database must be
//! percent-encoded, as they already are in a URL. Query values are
//! form-decoded, so `+` stands for a space.
//!
//! `tcp(host:port)` is understood as well, but only by [`Dsn::parse`]
//! directly: a URL parser rejects the `:port)` part before the scheme is
//! ever stripped.

use percent_encoding::percent_decode_str;
use sqlx::mysql::{MySqlConnectOptions, MySqlSslMode};
use std::borrow::Cow;
use std::path::PathBuf;
use std::str::Utf8Error;
use thiserror::Error;
use url::form_urlencoded;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3306;

/// Why a connection string was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DsnError {
    /// The port is not a number in `0..=65535`.
    #[error("invalid port {0:?}")]
    InvalidPort(String),
    /// `net(addr)` named a network other than `tcp` or `unix`.
    #[error("unknown network {0:?}")]
    UnknownNetwork(String),
    /// `net(addr)` is missing its closing parenthesis.
    #[error("unclosed address parenthesis")]
    UnclosedAddress,
    /// Something other than `/database` or `?params` follows the address.
    #[error("unexpected {0:?} after address")]
    UnexpectedInput(String),
    /// A percent-encoded part does not decode to UTF-8.
    #[error("invalid percent-encoding: {0}")]
    InvalidEncoding(#[from] Utf8Error),
    /// A recognised parameter has a value the driver does not accept.
    #[error("invalid value {value:?} for parameter {name:?}")]
    InvalidParam {
        /// Parameter name as written.
        name: String,
        /// Rejected value.
        value: String,
    },
}

/// Where the server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// TCP endpoint; missing parts fall back to `localhost:3306`.
    Tcp {
        /// Host name or IP address, without IPv6 brackets.
        host: Option<String>,
        /// Port number.
        port: Option<u16>,
    },
    /// Unix domain socket.
    Unix(PathBuf),
}

/// A parsed connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsn {
    /// Login user.
    pub user: Option<String>,
    /// Login password.
    pub password: Option<String>,
    /// Server address.
    pub address: Address,
    /// Default database.
    pub database: Option<String>,
    /// Query parameters, in order of appearance.
    pub params: Vec<(String, String)>,
}

impl Dsn {
    /// Parses a connection string.
    pub fn parse(s: &str) -> Result<Self, DsnError> {
        // userinfo cannot hold an unencoded '/' or '?'
        let head_end = s.find(['/', '?']).unwrap_or(s.len());
        let (userinfo, rest) = match s[..head_end].find('@') {
            Some(at) => (Some(&s[..at]), &s[at + 1..]),
            None => (None, s),
        };

        let (user, password) = match userinfo {
            Some(info) => {
                let (user, password) = match info.split_once(':') {
                    Some((user, password)) => (user, Some(password)),
                    None => (info, None),
                };
                let user = decode(user)?;
                let user = (!user.is_empty()).then(|| user.into_owned());
                let password = password.map(decode).transpose()?.map(Cow::into_owned);
                (user, password)
            }
            None => (None, None),
        };

        let (address, rest) = parse_address(rest)?;

        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };

        let database = match path.strip_prefix('/') {
            Some(name) if !name.is_empty() => Some(decode(name)?.into_owned()),
            Some(_) => None,
            None if path.is_empty() => None,
            None => return Err(DsnError::UnexpectedInput(path.to_owned())),
        };

        let params = query
            .map(|q| {
                form_urlencoded::parse(q.as_bytes())
                    .map(|(name, value)| (name.into_owned(), value.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Dsn {
            user,
            password,
            address,
            database,
            params,
        })
    }

    /// Builds driver options from this connection string.
    ///
    /// Recognised parameters are `ssl-mode`, `ssl-ca`, `charset`,
    /// `collation` and `socket` (`sslmode` and `sslca` are accepted too).
    /// Others are ignored.
    pub fn connect_options(&self) -> Result<MySqlConnectOptions, DsnError> {
        let mut options = MySqlConnectOptions::new();

        options = match &self.address {
            Address::Tcp { host, port } => options
                .host(host.as_deref().unwrap_or(DEFAULT_HOST))
                .port(port.unwrap_or(DEFAULT_PORT)),
            Address::Unix(path) => options.socket(path),
        };

        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        if let Some(database) = &self.database {
            options = options.database(database);
        }

        for (name, value) in &self.params {
            options = match name.as_str() {
                "ssl-mode" | "sslmode" => {
                    let mode = value.parse::<MySqlSslMode>().map_err(|_| DsnError::InvalidParam {
                        name: name.clone(),
                        value: value.clone(),
                    })?;
                    options.ssl_mode(mode)
                }
                "ssl-ca" | "sslca" => options.ssl_ca(value),
                "charset" => options.charset(value),
                "collation" => options.collation(value),
                "socket" => options.socket(value),
                _ => {
                    tracing::trace!(param = %name, "ignoring unsupported dsn parameter");
                    options
                }
            };
        }

        Ok(options)
    }
}

fn decode(s: &str) -> Result<Cow<'_, str>, DsnError> {
    Ok(percent_decode_str(s).decode_utf8()?)
}

/// Splits the address off the front of `s`, returning what follows it.
fn parse_address(s: &str) -> Result<(Address, &str), DsnError> {
    let end = s.find(['/', '?', '(']).unwrap_or(s.len());

    if s[end..].starts_with('(') {
        let net = &s[..end];
        let close = s[end..].find(')').ok_or(DsnError::UnclosedAddress)? + end;
        let addr = &s[end + 1..close];
        let rest = &s[close + 1..];
        let address = match net {
            "tcp" | "tcp4" | "tcp6" => parse_host_port(addr)?,
            "unix" => Address::Unix(PathBuf::from(addr)),
            other => return Err(DsnError::UnknownNetwork(other.to_owned())),
        };
        return Ok((address, rest));
    }

    Ok((parse_host_port(&s[..end])?, &s[end..]))
}

fn parse_host_port(s: &str) -> Result<Address, DsnError> {
    let (host, port) = if let Some(bracketed) = s.strip_prefix('[') {
        match bracketed.split_once(']') {
            Some((host, "")) => (host, None),
            Some((host, port)) => match port.strip_prefix(':') {
                Some(port) => (host, Some(port)),
                None => return Err(DsnError::UnexpectedInput(port.to_owned())),
            },
            None => return Err(DsnError::UnclosedAddress),
        }
    } else {
        match s.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (s, None),
        }
    };

    let port = match port {
        Some(port) => Some(
            port.parse::<u16>()
                .map_err(|_| DsnError::InvalidPort(port.to_owned()))?,
        ),
        None => None,
    };

    Ok(Address::Tcp {
        host: (!host.is_empty()).then(|| host.to_owned()),
        port,
    })
}

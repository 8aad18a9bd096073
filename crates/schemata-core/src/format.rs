//! # String Formats
//!
//! Named semantic checks applied by string validators. Date and time
//! formats are anchored, case-insensitive RFC 3339 shapes; they check the
//! textual form only (`2018-02-31` is accepted).

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

const DATE: &str = r"(\d{4})-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01])";
const TIME: &str =
    r"([01][0-9]|2[0-3]):([0-5][0-9]):([0-5][0-9]|60)(.[0-9]+)?(Z|(\+|-)([01][0-9]|2[0-3]):([0-5][0-9]))";

// A pattern that fails to compile matches nothing, keeping validation fail-closed.
static DATE_RE: Lazy<Option<Regex>> = Lazy::new(|| anchored(DATE));
static TIME_RE: Lazy<Option<Regex>> = Lazy::new(|| anchored(TIME));
static DATE_TIME_RE: Lazy<Option<Regex>> = Lazy::new(|| anchored(&format!("{DATE}T{TIME}")));

static EMAIL_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
});

static HOSTNAME_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(
        r"^(([a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9\-]*[a-zA-Z0-9])\.)*([A-Za-z0-9]|[A-Za-z0-9][A-Za-z0-9\-]*[A-Za-z0-9])$",
    )
});

fn anchored(body: &str) -> Option<Regex> {
    Regex::new(&format!("(?i)^{body}$")).ok()
}

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern).ok()
}

fn is_match(re: &Lazy<Option<Regex>>, text: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(text))
}

/// A named string format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringFormat {
    /// `YYYY-MM-DD`.
    Date,
    /// `HH:MM:SS[.frac](Z|±HH:MM)`.
    Time,
    /// Date and time joined by `T`.
    DateTime,
    /// Mailbox address.
    Email,
    /// RFC 1123 host name (or IP literal).
    Hostname,
    /// Dotted-quad IPv4 address.
    Ipv4,
    /// IPv6 address.
    Ipv6,
    /// Absolute URI.
    Uri,
    /// Padded standard base64.
    Base64,
    /// Version 4 UUID.
    Uuid,
    /// UUID of any version.
    Guid,
}

impl StringFormat {
    /// Constraint code suffix used in violations.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "dateTime",
            Self::Email => "email",
            Self::Hostname => "hostname",
            Self::Ipv4 | Self::Ipv6 => "ip",
            Self::Uri => "uri",
            Self::Base64 => "base64",
            Self::Uuid | Self::Guid => "guid",
        }
    }

    /// Returns true if `text` is in this format.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Self::Date => is_match(&DATE_RE, text),
            Self::Time => is_match(&TIME_RE, text),
            Self::DateTime => is_match(&DATE_TIME_RE, text),
            Self::Email => text.len() <= 254 && is_match(&EMAIL_RE, text),
            Self::Hostname => {
                (text.len() <= 255 && is_match(&HOSTNAME_RE, text))
                    || text.parse::<Ipv4Addr>().is_ok()
                    || text.parse::<Ipv6Addr>().is_ok()
            }
            Self::Ipv4 => text.parse::<Ipv4Addr>().is_ok(),
            Self::Ipv6 => text.parse::<Ipv6Addr>().is_ok(),
            Self::Uri => url::Url::parse(text).is_ok(),
            Self::Base64 => STANDARD.decode(text).is_ok(),
            Self::Uuid => Uuid::parse_str(text).is_ok_and(|u| u.get_version_num() == 4),
            Self::Guid => Uuid::parse_str(text).is_ok(),
        }
    }
}

impl fmt::Display for StringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date-time",
            Self::Email => "email",
            Self::Hostname => "hostname",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::Uri => "uri",
            Self::Base64 => "base64",
            Self::Uuid => "uuid",
            Self::Guid => "guid",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_format() {
        for ok in ["2018-11-16", "2018-02-31"] {
            assert!(StringFormat::Date.matches(ok), "{ok} should be valid");
        }
        for bad in ["", "1akd2536", "20181116", "16-11-2018", "16-11-2018T12:12:12Z", "12:12:12Z"] {
            assert!(!StringFormat::Date.matches(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn test_time_format() {
        for ok in [
            "12:00:00Z",
            "12:00:00+02:10",
            "12:00:00-02:10",
            "12:00:00.1Z",
            "12:00:00.123Z",
            "12:00:00.123456789Z",
        ] {
            assert!(StringFormat::Time.matches(ok), "{ok} should be valid");
        }
        for bad in [
            "",
            "1akd2536",
            "2:0:0Z",
            "2:00:00Z",
            "12:00:00",
            "2018-11-16",
            "12:00:00.Z",
            "12:00:00+02",
            "12:00:00+2:00",
            "16-11-2018T12:12:12Z",
        ] {
            assert!(!StringFormat::Time.matches(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn test_date_time_format() {
        for ok in [
            "2018-11-16T12:00:00Z",
            "2018-11-16t12:00:00z",
            "2018-11-16T12:00:00+02:00",
            "2018-11-16T12:00:00-02:00",
            "2018-11-16T12:00:00.1Z",
            "2018-11-16T12:00:00.123456789Z",
        ] {
            assert!(StringFormat::DateTime.matches(ok), "{ok} should be valid");
        }
        for bad in [
            "",
            "1akd2536",
            "2018-11-16",
            "12:12:12Z",
            "20181116T121212Z",
            "2018-11-16T12:00:00",
            "2018-11-16T12:00:00.Z",
        ] {
            assert!(!StringFormat::DateTime.matches(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn test_network_formats() {
        assert!(StringFormat::Hostname.matches("isahost.com"));
        assert!(!StringFormat::Hostname.matches("not@host"));
        assert!(!StringFormat::Hostname.matches(""));
        assert!(StringFormat::Ipv4.matches("127.0.0.1"));
        assert!(!StringFormat::Ipv4.matches("asdf"));
        assert!(StringFormat::Ipv6.matches("::1"));
        assert!(!StringFormat::Ipv6.matches("asdf"));
        assert!(StringFormat::Uri.matches("http://example.com"));
        assert!(!StringFormat::Uri.matches("asdf"));
    }

    #[test]
    fn test_email_format() {
        assert!(StringFormat::Email.matches("right@email.com"));
        assert!(!StringFormat::Email.matches("wrongemail"));
        assert!(!StringFormat::Email.matches(""));
    }

    #[test]
    fn test_base64_and_uuid_formats() {
        assert!(StringFormat::Base64.matches("U3dhZ2dlciByb2Nrcw=="));
        assert!(!StringFormat::Base64.matches("hello"));
        assert!(StringFormat::Uuid.matches("36c6e954-3c0a-4fbf-a4cd-6993ffe3bdd2"));
        assert!(!StringFormat::Uuid.matches("36c6e954-3c0a-1fbf-a4cd-6993ffe3bdd2"));
        assert!(StringFormat::Guid.matches("36c6e954-3c0a-1fbf-a4cd-6993ffe3bdd2"));
        assert!(!StringFormat::Guid.matches("not a uuid"));
    }
}

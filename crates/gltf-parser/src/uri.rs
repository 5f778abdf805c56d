//! Small grammars embedded in string fields: asset versions and `data:` URIs.

use nom::bytes::complete::{tag, take_till, take_while};
use nom::character::complete::{char, digit1};
use nom::combinator::{all_consuming, map_res, rest};
use nom::sequence::separated_pair;
use nom::IResult;

/// A `<major>.<minor>` glTF version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

fn number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |digits: &str| digits.parse::<u32>())(input)
}

fn version(input: &str) -> IResult<&str, Version> {
    let (input, (major, minor)) = separated_pair(number, char('.'), number)(input)?;
    Ok((input, Version { major, minor }))
}

/// Parse a whole version string. Anything but exactly `<digits>.<digits>` is rejected.
pub fn parse_version(s: &str) -> Option<Version> {
    all_consuming(version)(s).ok().map(|(_, v)| v)
}

/// The pieces of a `data:` URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUri<'a> {
    /// Media type before the first `;` or `,`; may be empty.
    pub mime_type: &'a str,
    /// Whether the `;base64` parameter is present.
    pub base64: bool,
    /// Everything after the first comma.
    pub payload: &'a str,
}

fn data_uri(input: &str) -> IResult<&str, DataUri<'_>> {
    let (input, _) = tag("data:")(input)?;
    let (input, mime_type) = take_while(|c: char| c != ';' && c != ',')(input)?;
    let (input, params) = take_till(|c: char| c == ',')(input)?;
    let (input, _) = char(',')(input)?;
    let (input, payload) = rest(input)?;
    let base64 = params.split(';').any(|param| param == "base64");
    Ok((
        input,
        DataUri {
            mime_type,
            base64,
            payload,
        },
    ))
}

/// Split a `data:` URI. Returns `None` for any other scheme or a missing comma.
pub fn parse_data_uri(uri: &str) -> Option<DataUri<'_>> {
    data_uri(uri).ok().map(|(_, parsed)| parsed)
}

/// Whether `uri` uses the `data:` scheme.
pub fn is_data_uri(uri: &str) -> bool {
    uri.starts_with("data:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("2.0"), Some(Version { major: 2, minor: 0 }));
        assert_eq!(parse_version("10.12"), Some(Version { major: 10, minor: 12 }));
        assert_eq!(parse_version("2"), None);
        assert_eq!(parse_version("2.0.1"), None);
        assert_eq!(parse_version("v2.0"), None);
        assert_eq!(parse_version(""), None);
    }

    #[test]
    fn test_version_ordering() {
        let v20 = Version { major: 2, minor: 0 };
        let v21 = Version { major: 2, minor: 1 };
        let v30 = Version { major: 3, minor: 0 };
        assert!(v20 < v21);
        assert!(v21 < v30);
        assert_eq!(v21.to_string(), "2.1");
    }

    #[test]
    fn test_parse_base64_data_uri() {
        let parsed = parse_data_uri("data:application/octet-stream;base64,AgED").unwrap();
        assert_eq!(parsed.mime_type, "application/octet-stream");
        assert!(parsed.base64);
        assert_eq!(parsed.payload, "AgED");
    }

    #[test]
    fn test_parse_data_uri_with_extra_params() {
        let parsed = parse_data_uri("data:image/png;name=a.png;base64,iVBO").unwrap();
        assert_eq!(parsed.mime_type, "image/png");
        assert!(parsed.base64);
        assert_eq!(parsed.payload, "iVBO");
    }

    #[test]
    fn test_parse_plain_data_uri() {
        let parsed = parse_data_uri("data:,hello").unwrap();
        assert_eq!(parsed.mime_type, "");
        assert!(!parsed.base64);
        assert_eq!(parsed.payload, "hello");
    }

    #[test]
    fn test_reject_non_data_uri() {
        assert!(parse_data_uri("buffer.bin").is_none());
        assert!(parse_data_uri("data:application/octet-stream;base64").is_none());
        assert!(!is_data_uri("http://example.com/a.bin"));
    }
}

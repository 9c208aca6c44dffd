//! Carved records and their stable report layout.

use std::fmt;

/// A record with every required field is complete; a record missing one or
/// more optional fields is only partially carved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Complete,
    PartiallyCarved,
}

/// The five artifact kinds this carver knows how to reconstruct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    BrowserActivity,
    BrowserRequest,
    TabSession,
    HttpRequest,
    SocksRequest,
}

impl ArtifactKind {
    /// The canonical type name shown in reports.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Self::BrowserActivity => "Potential Browser Activity",
            Self::BrowserRequest => "Browser Request",
            Self::TabSession => "Browser Tab Session Data",
            Self::HttpRequest => "HTTP Request",
            Self::SocksRequest => "SOCKS5 Browser Request",
        }
    }

    /// Short name used for CSV file names and the `-a` kind filter.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::BrowserActivity => "activity",
            Self::BrowserRequest => "requests",
            Self::TabSession => "sessions",
            Self::HttpRequest => "http",
            Self::SocksRequest => "socks",
        }
    }

    /// CSV header row, stable order.
    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            Self::BrowserActivity => &["Offset", "Type", "Extracted Data"],
            Self::BrowserRequest => &[
                "Offset",
                "Type",
                "Private Browsing ID",
                "First Party Domain",
                "Request",
            ],
            Self::TabSession => &["Offset", "Type", "URL", "Title", "FavIcon URL"],
            Self::HttpRequest => &[
                "Offset",
                "Type",
                "Method",
                "Request ID",
                "URL",
                "Origin URL",
                "Document URL",
                "Resource Type",
            ],
            Self::SocksRequest => &[
                "Offset",
                "Type",
                "TLS Flags",
                "Requested Connection",
                "SOCKS Info",
                "Session Connection",
                "Private Browsing ID",
                "First Party Domain",
            ],
        }
    }

    /// Walk-order field names mapped onto the columns after Offset and Type.
    /// HTTP requests report the method ahead of the request id, so this is
    /// not always the walk order itself.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::BrowserActivity => &["data"],
            Self::BrowserRequest => &["private_browsing_id", "first_party_domain", "request"],
            Self::TabSession => &["url", "title", "favicon_url"],
            Self::HttpRequest => &[
                "method",
                "request_id",
                "url",
                "origin_url",
                "document_url",
                "resource_type",
            ],
            Self::SocksRequest => &[
                "tls_flags",
                "requested_connection",
                "socks_info",
                "session_connection",
                "private_browsing_id",
                "first_party_domain",
            ],
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// One carved artifact. Built entirely within a single walk and immutable
/// afterwards; the offset is the position of the anchor signature match.
#[derive(Debug)]
pub struct Record {
    pub offset: usize,
    pub kind: ArtifactKind,
    pub classification: Classification,

    /// Decoded field values in walk order.
    pub values: Vec<(&'static str, String)>,
}

impl Record {
    /// The Type column: the canonical name, or its "Partially Carved"
    /// variant.
    pub fn entry_type(&self) -> String {
        match self.classification {
            Classification::Complete => self.kind.canonical_name().to_string(),
            Classification::PartiallyCarved => {
                format!("Partially Carved {}", self.kind.canonical_name())
            }
        }
    }

    pub fn value(&self, name: &str) -> &str {
        self.values
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or_default()
    }

    /// The full CSV row in the kind's stable column order.
    pub fn csv_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(self.kind.headers().len());
        row.push(self.offset.to_string());
        row.push(self.entry_type());
        for column in self.kind.columns() {
            row.push(self.value(column).to_string());
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_type_variants() {
        let record = Record {
            offset: 42,
            kind: ArtifactKind::SocksRequest,
            classification: Classification::PartiallyCarved,
            values: vec![],
        };
        assert_eq!(record.entry_type(), "Partially Carved SOCKS5 Browser Request");
    }

    #[test]
    fn csv_row_reorders_http_columns() {
        let record = Record {
            offset: 7,
            kind: ArtifactKind::HttpRequest,
            classification: Classification::Complete,
            values: vec![
                ("request_id", String::from("abc")),
                ("url", String::from("http://x.onion")),
                ("origin_url", String::from("Unknown")),
                ("document_url", String::from("Unknown")),
                ("method", String::from("GET")),
                ("resource_type", String::from("script")),
            ],
        };
        let row = record.csv_row();
        assert_eq!(row[0], "7");
        assert_eq!(row[1], "HTTP Request");
        assert_eq!(row[2], "GET");
        assert_eq!(row[3], "abc");
        assert_eq!(row[4], "http://x.onion");
        assert_eq!(row.len(), record.kind.headers().len());
    }

    #[test]
    fn headers_and_columns_line_up() {
        for kind in [
            ArtifactKind::BrowserActivity,
            ArtifactKind::BrowserRequest,
            ArtifactKind::TabSession,
            ArtifactKind::HttpRequest,
            ArtifactKind::SocksRequest,
        ] {
            assert_eq!(kind.headers().len(), kind.columns().len() + 2);
        }
    }
}

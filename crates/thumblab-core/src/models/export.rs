use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// File formats offered by the export dialog.
///
/// PNG is the free format; the rest carry a fixed credit cost settled
/// before the asset is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExportFormat {
    Png,
    Jpg,
    Webp,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Png,
        ExportFormat::Jpg,
        ExportFormat::Webp,
        ExportFormat::Pdf,
    ];

    /// Fixed credit cost of exporting in this format.
    pub fn credit_cost(self) -> u64 {
        match self {
            ExportFormat::Png => 0,
            ExportFormat::Jpg => 10,
            ExportFormat::Webp => 12,
            ExportFormat::Pdf => 15,
        }
    }

    /// Lowercase file extension.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpg => "jpg",
            ExportFormat::Webp => "webp",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Display label, as shown in the export dialog.
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpg => "JPG",
            ExportFormat::Webp => "WEBP",
            ExportFormat::Pdf => "PDF",
        }
    }

    /// Whether exporting in this format costs anything at all.
    pub fn is_free(self) -> bool {
        self.credit_cost() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_png_is_free() {
        for format in ExportFormat::ALL {
            assert_eq!(format.is_free(), format == ExportFormat::Png);
        }
    }

    #[test]
    fn costs_match_dialog() {
        assert_eq!(ExportFormat::Png.credit_cost(), 0);
        assert_eq!(ExportFormat::Jpg.credit_cost(), 10);
        assert_eq!(ExportFormat::Webp.credit_cost(), 12);
        assert_eq!(ExportFormat::Pdf.credit_cost(), 15);
    }
}

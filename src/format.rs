//! Formatting helpers for human-readable byte sizes.

/// Formats a byte count as a human-readable string (bytes, KB, MB, GB).
///
/// Mirrors the display format the web front-end expects: two decimals for
/// KB and above, a plain `"<n> bytes"` below 1 KB.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(500), "500 bytes");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
        assert_eq!(format_size(1073741824), "1.00 GB");
    }

    #[test]
    fn format_size_zero() {
        assert_eq!(format_size(0), "0 bytes");
    }

    #[test]
    fn format_size_below_boundary_stays_in_lower_unit() {
        assert_eq!(format_size(1023), "1023 bytes");
        assert_eq!(format_size(1_048_575), "1024.00 KB");
        assert_eq!(format_size(1_073_741_823), "1024.00 MB");
    }

    #[test]
    fn format_size_exact_boundaries() {
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1_048_576), "1.00 MB");
        assert_eq!(format_size(1_073_741_824), "1.00 GB");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn format_size_never_panics(bytes in 0u64..u64::MAX) {
                let _ = format_size(bytes);
            }

            #[test]
            fn format_size_has_unit_suffix(bytes in 0u64..u64::MAX) {
                let s = format_size(bytes);
                prop_assert!(
                    s.ends_with(" bytes")
                        || s.ends_with(" KB")
                        || s.ends_with(" MB")
                        || s.ends_with(" GB")
                );
            }
        }
    }
}

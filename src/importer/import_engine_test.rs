#[cfg(test)]
mod tests {
    use crate::importer::import_engine::ImportSummary;
    use assert_approx_eq::assert_approx_eq;

    fn summary(rows_read: u64, processed: u64, elapsed_secs: f64) -> ImportSummary {
        ImportSummary {
            rows_read,
            processed,
            skipped: 0,
            errors: 0,
            batches: 0,
            elapsed_secs,
        }
    }

    #[test]
    fn test_effectiveness() {
        assert_approx_eq!(summary(100, 50, 1.0).effectiveness(), 50.0);
        assert_approx_eq!(summary(3, 1, 1.0).effectiveness(), 100.0 / 3.0);
        //no rows read yet must not divide by zero
        assert_approx_eq!(summary(0, 0, 1.0).effectiveness(), 0.0);
    }

    #[test]
    fn test_rate() {
        assert_approx_eq!(summary(100, 100, 2.0).rate(), 50.0);
        assert_approx_eq!(summary(100, 100, 0.0).rate(), 0.0);
    }
}

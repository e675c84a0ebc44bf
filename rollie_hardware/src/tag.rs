//! Tag reader line protocol.
//!
//! The reader prints one ASCII line per tag. Whitespace-separated tokens that
//! start with `:` carry weights in grams: the first is the reference weight,
//! any further ones are previously recorded weights, oldest first. Other
//! tokens (UIDs, status words) are ignored.

use rollie_traits::TagRecord;

/// Parse one line from the tag reader.
///
/// Returns `None` when the line carries no `:` token or any `:` token is not
/// a finite number.
pub fn parse_tag_line(line: &str) -> Option<TagRecord> {
    let mut weights = line
        .split_whitespace()
        .filter_map(|tok| tok.strip_prefix(':'))
        .map(|w| w.parse::<f32>().ok().filter(|g| g.is_finite()));

    let reference_weight_g = weights.next()??;
    let history = weights.collect::<Option<Vec<f32>>>()?;
    Some(TagRecord {
        reference_weight_g,
        history,
    })
}

/// Line written back to the reader to store a weight on the tag.
pub fn format_weight_line(grams: f32) -> String {
    format!(":{}\n", grams.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("UID 04A2 :12000", 12000.0, vec![])]
    #[case(":9500 :70100 :70350", 9500.0, vec![70100.0, 70350.0])]
    #[case("  :12.5\r", 12.5, vec![])]
    fn parses_reference_and_history(
        #[case] line: &str,
        #[case] reference: f32,
        #[case] history: Vec<f32>,
    ) {
        let rec = parse_tag_line(line).unwrap();
        assert_eq!(rec.reference_weight_g, reference);
        assert_eq!(rec.history, history);
    }

    #[rstest]
    #[case("")]
    #[case("UID 04A2")]
    #[case(":heavy")]
    #[case(":12000 :oops")]
    #[case(":")]
    #[case(":NaN")]
    #[case(":12000 :inf")]
    fn rejects_lines_without_usable_weights(#[case] line: &str) {
        assert_eq!(parse_tag_line(line), None);
    }

    #[test]
    fn weight_line_is_rounded_grams() {
        assert_eq!(format_weight_line(70_349.6), ":70350\n");
        assert_eq!(format_weight_line(-4.4), ":-4\n");
    }
}

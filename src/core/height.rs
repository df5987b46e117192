use crate::domain::model::HeightParse;

pub const FEET_MARKER: char = '\'';
pub const INCHES_MARKER: char = '"';

/// Convert text like `6'8"` into total inches.
///
/// The text needs a feet marker followed (not necessarily immediately) by an inches
/// marker. The piece before the first marker must be a whole number of feet and the
/// piece between the markers a decimal number of inches. Spaces around either number
/// are allowed. Anything after the inches marker is ignored.
pub fn convert_height_text_to_inches(height_text: &str) -> HeightParse {
    if !has_correct_markers(height_text) {
        return HeightParse::Invalid;
    }

    let mut parts = height_text.split([FEET_MARKER, INCHES_MARKER]);
    let feet = parts.next().and_then(|part| part.trim().parse::<i64>().ok());
    let inches = parts.next().and_then(|part| part.trim().parse::<f64>().ok());

    match (feet, inches) {
        (Some(feet), Some(inches)) => {
            let total = feet as f64 * 12.0 + inches;
            // rejects "NaN"/"inf" inches and heights below zero
            if total.is_finite() && total >= 0.0 {
                HeightParse::Parsed(total)
            } else {
                HeightParse::Invalid
            }
        }
        _ => HeightParse::Invalid,
    }
}

fn has_correct_markers(height_text: &str) -> bool {
    match (height_text.find(FEET_MARKER), height_text.find(INCHES_MARKER)) {
        (Some(feet_at), Some(inches_at)) => inches_at >= feet_at,
        _ => false,
    }
}

use crate::buffer::PixelBuffer;

const RAMP: &[u8] = b" .:-=+*#%@";

/// Text rendering of a buffer's alpha channel, for terminals and logs.
///
/// The buffer is sampled down to at most `columns` characters per line;
/// rows are sampled at twice the column step since terminal cells are tall.
pub fn ascii_preview(buffer: &PixelBuffer, columns: usize) -> String {
    if buffer.is_empty() || columns == 0 {
        return String::new();
    }
    let width = buffer.width() as usize;
    let step = width.div_ceil(columns).max(1);

    let mut out = String::new();
    for y in (0..buffer.height()).step_by(step * 2) {
        let line: String = (0..buffer.width())
            .step_by(step)
            .map(|x| {
                let alpha = buffer.pixel(x, y).map_or(0, |px| px.a) as usize;
                RAMP[alpha * (RAMP.len() - 1) / 255] as char
            })
            .collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/*!
Provides convenience routines for escaping raw bytes in error messages.
*/

/// Provides a convenient `Debug` implementation for a `u8`.
///
/// The `Debug` impl treats the byte as an ASCII, and emits a human readable
/// representation of it. If the byte isn't ASCII, then it's emitted as a hex
/// escape sequence.
#[derive(Clone, Copy)]
pub(crate) struct Byte(pub(crate) u8);

impl core::fmt::Display for Byte {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if self.0 == b' ' {
            return f.write_str(" ");
        }
        for (i, b) in core::ascii::escape_default(self.0).enumerate() {
            // capitalize \xab to \xAB
            let b = if i >= 2 { b.to_ascii_uppercase() } else { b };
            write!(f, "{}", char::from(b))?;
        }
        Ok(())
    }
}

impl core::fmt::Debug for Byte {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "\"")?;
        core::fmt::Display::fmt(self, f)?;
        write!(f, "\"")?;
        Ok(())
    }
}

/// Returns the rest of `input` starting at `position`, truncated so that it
/// stays readable when embedded in an error message.
pub(crate) fn rest(input: &str, position: usize) -> Box<str> {
    const MAX: usize = 32;

    let rest = input.get(position..).unwrap_or("");
    match rest.char_indices().nth(MAX) {
        None => rest.into(),
        Some((end, _)) => format!("{}...", &rest[..end]).into_boxed_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte() {
        assert_eq!(Byte(b'a').to_string(), "a");
        assert_eq!(Byte(b'\n').to_string(), "\\n");
        assert_eq!(Byte(0xFF).to_string(), "\\xFF");
        assert_eq!(format!("{:?}", Byte(b'x')), "\"x\"");
    }

    #[test]
    fn rest_truncates() {
        assert_eq!(&*rest("abc", 1), "bc");
        assert_eq!(&*rest("abc", 3), "");
        assert_eq!(&*rest("abc", 10), "");
        let long = "x".repeat(40);
        assert_eq!(&*rest(&long, 0), &*format!("{}...", "x".repeat(32)));
    }
}

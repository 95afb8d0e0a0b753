/// Split text on the ASCII space character, skipping empty pieces.
///
/// Tabs, newlines and other control characters are not separators; they stay
/// inside the word and make it invalid (see [`is_valid_word`]).
pub fn split_into_words(text: &str) -> Vec<&str> {
    text.split(' ').filter(|word| !word.is_empty()).collect()
}

/// A word is valid when it contains no control characters (bytes below 0x20).
pub fn is_valid_word(word: &str) -> bool {
    !word.bytes().any(|b| b < b' ')
}

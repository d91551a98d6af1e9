/// Join named text blocks under `### name ###` headers, in iteration order.
///
/// ```
/// let text = engkit_core::get_formatted_logs([("a", "hello"), ("b", "world")]);
/// assert_eq!(text, "### a ###\nhello\n### b ###\nworld\n");
/// ```
pub fn get_formatted_logs<I, K, V>(entries: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    entries
        .into_iter()
        .map(|(name, output)| format!("### {} ###\n{}\n", name.as_ref(), output.as_ref()))
        .collect()
}

// Notifier plugin implementations
pub mod email;
pub mod slack;
pub mod telegram;

pub use email::EmailNotifier;
pub use slack::SlackNotifier;
pub use telegram::TelegramNotifier;

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

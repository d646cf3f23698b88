//! Account email templates.

use crate::OutgoingMail;

const PRODUCT_NAME: &str = "Quranic Transformation";

/// Email asking a new user to confirm their address.
pub fn verification_email(to: &str, name: &str, link: &str, valid_hours: i64) -> OutgoingMail {
    OutgoingMail {
        to: to.to_string(),
        subject: format!("Verify your email for {PRODUCT_NAME}"),
        body: format!(
            "Assalamu alaikum {name},\n\n\
             Please confirm your email address by opening the link below:\n\n\
             {link}\n\n\
             The link is valid for {valid_hours} hours. If you did not create an \
             account, you can ignore this message.\n"
        ),
    }
}

/// Email carrying a password reset link.
pub fn password_reset_email(to: &str, name: &str, link: &str, valid_minutes: i64) -> OutgoingMail {
    OutgoingMail {
        to: to.to_string(),
        subject: format!("Reset your {PRODUCT_NAME} password"),
        body: format!(
            "Assalamu alaikum {name},\n\n\
             A password reset was requested for your account. Open the link below \
             to choose a new password:\n\n\
             {link}\n\n\
             The link is valid for {valid_minutes} minutes and can be used once. \
             If you did not request this, no action is needed.\n"
        ),
    }
}

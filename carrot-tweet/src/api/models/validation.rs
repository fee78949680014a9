//! Field rules shared by sign-up and profile editing.
//!
//! Each check appends its messages to a [`FieldErrors`] so a form can report every problem
//! at once; [`FieldErrors::into_result`] turns the collection into a 400.

use crate::{config::PasswordConfig, errors::FieldErrors};

pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 20;
pub const BIO_MAX_LENGTH: usize = 500;
pub const NEW_PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_SPECIAL_CHARACTERS: &str = "@$!%*?&";

/// 3 to 20 characters out of `[A-Za-z0-9_]`.
pub fn check_username(username: &str, errors: &mut FieldErrors) {
    let length = username.chars().count();
    if length < USERNAME_MIN_LENGTH {
        errors.add("username", format!("Username must be at least {USERNAME_MIN_LENGTH} characters long"));
    } else if length > USERNAME_MAX_LENGTH {
        errors.add("username", format!("Username must be at most {USERNAME_MAX_LENGTH} characters long"));
    }

    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        errors.add("username", "Username may only contain letters, numbers and underscores");
    }
}

/// Emails are compared and stored trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A single `@` with something on both sides, a dot inside the domain, and no whitespace.
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

pub fn check_email(email: &str, errors: &mut FieldErrors) {
    if email.is_empty() {
        errors.add("email", "Email is required");
    } else if !is_plausible_email(email) {
        errors.add("email", "Please enter a valid email address");
    }
}

/// Sign-up password: configured length bounds, at least one digit, confirmed.
pub fn check_signup_password(password: &str, confirm_password: &str, rules: &PasswordConfig, errors: &mut FieldErrors) {
    let length = password.chars().count();
    if length < rules.min_length {
        errors.add("password", format!("Password must be at least {} characters long", rules.min_length));
    } else if length > rules.max_length {
        errors.add("password", format!("Password must be at most {} characters long", rules.max_length));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.add("password", "Password must include at least one number");
    }

    if password != confirm_password {
        errors.add("confirm_password", "Passwords do not match");
    }
}

/// New password on the profile form.
///
/// At least 8 characters from `[A-Za-z0-9@$!%*?&]`, with one of each: lowercase, uppercase,
/// digit and special character.
pub fn check_new_password(password: &str, errors: &mut FieldErrors) {
    let is_special = |c: char| PASSWORD_SPECIAL_CHARACTERS.contains(c);

    if password.chars().count() < NEW_PASSWORD_MIN_LENGTH {
        errors.add(
            "new_password",
            format!("New password must be at least {NEW_PASSWORD_MIN_LENGTH} characters long"),
        );
    }

    let allowed = password.chars().all(|c| c.is_ascii_alphanumeric() || is_special(c));
    let complete = password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(is_special);

    if !allowed || !complete {
        errors.add(
            "new_password",
            format!(
                "New password must contain uppercase and lowercase letters, a number and a special character ({PASSWORD_SPECIAL_CHARACTERS})"
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn username_errors(username: &str) -> Option<Vec<String>> {
        let mut errors = FieldErrors::new();
        check_username(username, &mut errors);
        errors.get("username").map(<[String]>::to_vec)
    }

    #[test]
    fn test_username_rules() {
        assert!(username_errors("bob").is_none());
        assert!(username_errors("carrot_fan_2024").is_none());
        assert!(username_errors("a".repeat(20).as_str()).is_none());

        assert!(username_errors("ab").is_some());
        assert!(username_errors("a".repeat(21).as_str()).is_some());
        assert!(username_errors("has space").is_some());
        assert!(username_errors("dash-ed").is_some());
        assert!(username_errors("ünïcode").is_some());
    }

    #[test]
    fn test_email_normalization_and_plausibility() {
        assert_eq!(normalize_email("  Bob@Example.COM "), "bob@example.com");

        assert!(is_plausible_email("bob@example.com"));
        assert!(is_plausible_email("b.o+b@mail.example.co.uk"));

        assert!(!is_plausible_email("bob"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("bob@example"));
        assert!(!is_plausible_email("bob@@example.com"));
        assert!(!is_plausible_email("bob@exa mple.com"));
        assert!(!is_plausible_email("bob@example."));
    }

    #[test]
    fn test_signup_password_rules() {
        let rules = PasswordConfig::default();

        let mut errors = FieldErrors::new();
        check_signup_password("carrots123", "carrots123", &rules, &mut errors);
        assert!(errors.is_empty());

        let mut errors = FieldErrors::new();
        check_signup_password("carrots!!", "carrots!!", &rules, &mut errors);
        assert_eq!(errors.get("password").map(<[String]>::len), Some(1));

        let mut errors = FieldErrors::new();
        check_signup_password("c1", "c2", &rules, &mut errors);
        assert!(errors.get("password").is_some());
        assert!(errors.get("confirm_password").is_some());
    }

    #[test]
    fn test_new_password_rules() {
        let check = |pw: &str| {
            let mut errors = FieldErrors::new();
            check_new_password(pw, &mut errors);
            errors.is_empty()
        };

        assert!(check("Carrot1!"));
        assert!(check("Sup3r$ecret&"));

        assert!(!check("Car1!")); // too short
        assert!(!check("carrot12!")); // no uppercase
        assert!(!check("CARROT12!")); // no lowercase
        assert!(!check("Carrots!!")); // no digit
        assert!(!check("Carrots12")); // no special
        assert!(!check("Carrot 12!")); // space not allowed
        assert!(!check("Carrot12#")); // # is not one of the allowed specials
    }
}

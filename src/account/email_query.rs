use serde::Deserialize;

use crate::Error;

/// The `?email=` query parameter used by the account lookup routes.
#[derive(Debug, Default, Deserialize)]
pub struct EmailQuery {
    /// The email of the account to look up.
    pub email: Option<String>,
}

impl EmailQuery {
    /// The trimmed email.
    ///
    /// # Errors
    /// Returns [Error::MissingEmail] if the parameter is absent or blank.
    pub fn required_email(&self) -> Result<&str, Error> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .ok_or(Error::MissingEmail)
    }
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::EmailQuery;

    #[test]
    fn missing_or_blank_email_is_rejected() {
        assert_eq!(EmailQuery::default().required_email(), Err(Error::MissingEmail));
        assert_eq!(
            EmailQuery {
                email: Some("  ".to_owned())
            }
            .required_email(),
            Err(Error::MissingEmail)
        );
    }

    #[test]
    fn email_is_trimmed() {
        let query = EmailQuery {
            email: Some(" bob@example.com ".to_owned()),
        };

        assert_eq!(query.required_email(), Ok("bob@example.com"));
    }
}

use serde::Serialize;
use url::Url;

/// Route shown once the backend has accepted an application.
pub const SUCCESS_PATH: &str = "/recrutements-success";

/// Router seam. Navigation is fire-and-forget.
pub trait Navigator: Send + Sync {
    fn navigate(&self, request: NavigationRequest);
}

/// A destination path plus ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl NavigationRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Absolute URL of the destination on the given front-end origin.
    pub fn to_url(&self, origin: &Url) -> Result<Url, url::ParseError> {
        let mut url = origin.join(&self.path)?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(
                self.query
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str())),
            );
        }
        Ok(url)
    }
}

/// Parameters carried to the success page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessRedirect {
    pub application_number: String,
    pub application_id: String,
    pub email: String,
    pub training_title: String,
    pub status: String,
}

impl SuccessRedirect {
    pub fn into_request(self) -> NavigationRequest {
        NavigationRequest {
            path: SUCCESS_PATH.to_string(),
            query: vec![
                ("applicationNumber".to_string(), self.application_number),
                ("applicationId".to_string(), self.application_id),
                ("email".to_string(), self.email),
                ("trainingTitle".to_string(), self.training_title),
                ("status".to_string(), self.status),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redirect() -> SuccessRedirect {
        SuccessRedirect {
            application_number: "A123".to_string(),
            application_id: "5".to_string(),
            email: "awa.diop@example.sn".to_string(),
            training_title: "Développement Web & Mobile".to_string(),
            status: "APPROVED".to_string(),
        }
    }

    #[test]
    fn redirect_targets_success_page_with_named_params() {
        let request = redirect().into_request();
        assert_eq!(request.path, SUCCESS_PATH);
        assert_eq!(request.param("applicationNumber"), Some("A123"));
        assert_eq!(request.param("applicationId"), Some("5"));
        assert_eq!(request.param("email"), Some("awa.diop@example.sn"));
        assert_eq!(request.param("trainingTitle"), Some("Développement Web & Mobile"));
        assert_eq!(request.param("status"), Some("APPROVED"));
        assert_eq!(request.param("missing"), None);
    }

    #[test]
    fn url_encodes_query_values() {
        let origin = Url::parse("http://localhost:4200").expect("valid origin");
        let url = redirect().into_request().to_url(&origin).expect("url builds");

        assert_eq!(url.path(), "/recrutements-success");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs.len(), 5);
        assert_eq!(
            pairs[3],
            (
                "trainingTitle".to_string(),
                "Développement Web & Mobile".to_string()
            )
        );
        assert!(!url.as_str().contains(' '));
    }
}

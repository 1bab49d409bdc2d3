use serde::{Deserialize, Serialize};

use crate::business::application::DataSubset;

/// Settings captured by the fast-deploy form. Every field is mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastDeployApplicationData {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub web_app: String,
    #[serde(default)]
    pub url_site: String,
    #[serde(default)]
    pub workgroup: String,
}

impl DataSubset for FastDeployApplicationData {
    const NAME: &'static str = "fastdeploy";
}

/// Blank mandatory field, with the i18n key of its message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must not be empty")]
pub struct ValidationError {
    pub field: &'static str,
    pub message_key: &'static str,
}

impl FastDeployApplicationData {
    /// Collect one error per blank field, in declaration order.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let checks = [
            (
                "code",
                &self.code,
                "module.appcenter.fastdeploy.validation.applicationCode.notEmpty",
            ),
            (
                "name",
                &self.name,
                "module.appcenter.fastdeploy.validation.applicationName.notEmpty",
            ),
            (
                "webApp",
                &self.web_app,
                "module.appcenter.fastdeploy.validation.applicationWebApp.notEmpty",
            ),
            (
                "urlSite",
                &self.url_site,
                "module.appcenter.fastdeploy.validation.applicationSiteUrl.notEmpty",
            ),
            (
                "workgroup",
                &self.workgroup,
                "module.appcenter.fastdeploy.validation.applicationWorkgroup.notEmpty",
            ),
        ];

        let errors: Vec<ValidationError> = checks
            .into_iter()
            .filter(|(_, value, _)| value.trim().is_empty())
            .map(|(field, _, message_key)| ValidationError { field, message_key })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::business::application::DataSubset;

/// Source repositories of an application's site and plugins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcesData {
    #[serde(default)]
    pub site_repository: Option<String>,
    #[serde(default)]
    pub plugin_repositories: Vec<String>,
}

impl SourcesData {
    pub fn add_plugin_repository(&mut self, repository: impl Into<String>) {
        self.plugin_repositories.push(repository.into());
    }
}

impl DataSubset for SourcesData {
    const NAME: &'static str = "sources";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business::application::{data_subset, merge_data_subset};

    const SITE_DIRECTORY: &str = "http://dev.lutece.paris.fr/svn/lutece/portal/trunk/plugins/cms/plugin-stock/";
    const PLUGIN_DIRECTORY: &str = "http://dev.lutece.paris.fr/svn/lutece/portal/trunk/plugins/cms/plugin-rating/";

    #[test]
    fn reads_sources_subset_from_stored_json() {
        let json = format!(
            "{{\"sources\":{{\"siteRepository\":\"{SITE_DIRECTORY}\",\"pluginRepositories\":[\"{PLUGIN_DIRECTORY}\"]}}}}\n"
        );
        let data: SourcesData = data_subset(Some(&json))
            .expect("decode")
            .expect("subset present");

        assert_eq!(data.site_repository.as_deref(), Some(SITE_DIRECTORY));
        assert_eq!(data.plugin_repositories[0], PLUGIN_DIRECTORY);
    }

    #[test]
    fn writes_camel_case_keys() {
        let mut data = SourcesData {
            site_repository: Some(SITE_DIRECTORY.to_string()),
            ..SourcesData::default()
        };
        data.add_plugin_repository(PLUGIN_DIRECTORY);

        let json = merge_data_subset(None, &data).expect("merge");
        assert!(json.contains("\"siteRepository\""));
        assert!(json.contains("\"pluginRepositories\""));
    }
}

//! Panel titles.

use std::collections::BTreeMap;

use geo_common::{GeoError, GeoResult};
use serde::{Deserialize, Serialize};

/// How each panel of the stacked figure is titled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PanelTitles {
    /// The year itself.
    #[default]
    Years,
    /// Looked up by year; years without an entry fall back to the year.
    ByYear(BTreeMap<String, String>),
    /// One title per year, in year order.
    Positional(Vec<String>),
}

impl PanelTitles {
    /// Titles for `years`, in the same order.
    pub fn resolve(&self, years: &[String]) -> GeoResult<Vec<String>> {
        match self {
            PanelTitles::Years => Ok(years.to_vec()),
            PanelTitles::ByYear(map) => Ok(years
                .iter()
                .map(|y| map.get(y).cloned().unwrap_or_else(|| y.clone()))
                .collect()),
            PanelTitles::Positional(titles) => {
                if titles.len() != years.len() {
                    return Err(GeoError::invalid_parameter(
                        "titles",
                        format!("{} titles given for {} years", titles.len(), years.len()),
                    ));
                }
                Ok(titles.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn years() -> Vec<String> {
        vec!["2019".into(), "2020".into(), "2021".into()]
    }

    #[test]
    fn test_default_is_year() {
        assert_eq!(PanelTitles::default().resolve(&years()).unwrap(), years());
    }

    #[test]
    fn test_by_year_falls_back() {
        let mut map = BTreeMap::new();
        map.insert("2020".to_string(), "Flood".to_string());
        let titles = PanelTitles::ByYear(map).resolve(&years()).unwrap();
        assert_eq!(titles, vec!["2019", "Flood", "2021"]);
    }

    #[test]
    fn test_positional_length_checked() {
        let ok = PanelTitles::Positional(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(ok.resolve(&years()).unwrap()[2], "c");

        let short = PanelTitles::Positional(vec!["a".into()]);
        assert!(matches!(
            short.resolve(&years()),
            Err(GeoError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_deserialize_forms() {
        let map: PanelTitles = serde_json::from_str(r#"{"2020": "Flood"}"#).unwrap();
        assert!(matches!(map, PanelTitles::ByYear(_)));
        let list: PanelTitles = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert!(matches!(list, PanelTitles::Positional(_)));
    }
}

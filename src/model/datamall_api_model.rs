use itertools::Itertools;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::bus_stop::BusStop;

/// One page of the DataMall `BusStops` endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct DataMallResponse {
    /// A missing or non-array `value` is read as an empty page.
    #[serde(default, deserialize_with = "records_or_empty")]
    pub value: Vec<DataMallBusStop>,
}

/// Every field falls back to its default when it's missing or has the wrong JSON type.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DataMallBusStop {
    #[serde(deserialize_with = "string_or_default")]
    pub bus_stop_code: String,
    #[serde(deserialize_with = "string_or_default")]
    pub road_name: String,
    #[serde(deserialize_with = "string_or_default")]
    pub description: String,
    #[serde(deserialize_with = "number_or_default")]
    pub latitude: f64,
    #[serde(deserialize_with = "number_or_default")]
    pub longitude: f64,
}

/// Decodes a response body into bus stops.
///
/// Only a body that isn't JSON at all is an error. Valid JSON without a `value` array is an
/// empty page, which ends pagination.
pub fn parse_page(body: &str) -> Result<Vec<BusStop>, serde_json::Error> {
    let json: Value = serde_json::from_str(body)?;

    if !json.is_object() {
        return Ok(Vec::new());
    }

    let page = DataMallResponse::deserialize(json)?;

    Ok(page.value.into_iter().map(BusStop::from).collect_vec())
}

fn records_or_empty<'de, D>(deserializer: D) -> Result<Vec<DataMallBusStop>, D::Error>
where
    D: Deserializer<'de>,
{
    let records = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(_) => DataMallBusStop::deserialize(item).unwrap_or_default(),
                _ => DataMallBusStop::default(),
            })
            .collect_vec(),
        _ => Vec::new(),
    };

    Ok(records)
}

fn string_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

fn number_or_default<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => Ok(n.as_f64().unwrap_or_default()),
        _ => Ok(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_record() {
        let body = r#"{
            "odata.metadata": "http://datamall2.mytransport.sg/ltaodataservice/$metadata#BusStops",
            "value": [
                {
                    "BusStopCode": "01012",
                    "RoadName": "Victoria St",
                    "Description": "Hotel Grand Pacific",
                    "Latitude": 1.29684825487647,
                    "Longitude": 103.85253591654006
                }
            ]
        }"#;

        let stops = parse_page(body).unwrap();

        assert_eq!(
            stops,
            vec![BusStop {
                stop_code: "01012".to_string(),
                road_name: "Victoria St".to_string(),
                description: "Hotel Grand Pacific".to_string(),
                latitude: 1.29684825487647,
                longitude: 103.85253591654006,
            }]
        );
    }

    #[test]
    fn missing_and_mistyped_fields_fall_back_to_defaults() {
        let body = r#"{"value": [
            {"BusStopCode": 1012, "Latitude": "1.3"},
            {"RoadName": "Orchard Rd", "Longitude": 103.8},
            42,
            ["01012", "Victoria St", "Hotel", 1.3, 103.8]
        ]}"#;

        let stops = parse_page(body).unwrap();

        assert_eq!(stops.len(), 4);
        assert_eq!(stops[0], BusStop::default());
        assert_eq!(stops[1].road_name, "Orchard Rd");
        assert_eq!(stops[1].stop_code, "");
        assert_eq!(stops[1].latitude, 0.0);
        assert_eq!(stops[1].longitude, 103.8);
        assert_eq!(stops[2], BusStop::default());
        assert_eq!(stops[3], BusStop::default());
    }

    #[test]
    fn keeps_page_order() {
        let body = r#"{"value": [{"BusStopCode": "3"}, {"BusStopCode": "1"}, {"BusStopCode": "2"}]}"#;

        let codes: Vec<String> = parse_page(body)
            .unwrap()
            .into_iter()
            .map(|s| s.stop_code)
            .collect();

        assert_eq!(codes, ["3", "1", "2"]);
    }

    #[test]
    fn empty_and_absent_value_are_empty_pages() {
        assert!(parse_page(r#"{"value": []}"#).unwrap().is_empty());
        assert!(parse_page(r#"{"odata.metadata": "x"}"#).unwrap().is_empty());
        assert!(parse_page(r#"{"value": "nope"}"#).unwrap().is_empty());
        assert!(parse_page(r#"[{"BusStopCode": "01012"}]"#).unwrap().is_empty());
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(parse_page("<html>Service Unavailable</html>").is_err());
        assert!(parse_page("").is_err());
    }
}

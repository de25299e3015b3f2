use super::datamall_api_model::DataMallBusStop;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct BusStop {
    /// Written to the `id` column. Usually numeric but it's a string in the API.
    pub stop_code: String,
    pub road_name: String,
    pub description: String,
    /// Decimal degrees
    pub latitude: f64,
    /// Decimal degrees
    pub longitude: f64,
}

impl From<DataMallBusStop> for BusStop {
    fn from(value: DataMallBusStop) -> Self {
        BusStop {
            stop_code: value.bus_stop_code,
            road_name: value.road_name,
            description: value.description,
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}

use std::path::{Path, PathBuf};

use tokio::{
    fs::File,
    io::{AsyncWriteExt, BufWriter},
};
use tracing::{Instrument, info, info_span};

use crate::{model::bus_stop::BusStop, utils::escape_sql_literal};

/// Tweaks to the generated statements. The defaults keep the long standing output format.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlOptions {
    /// Write the stop code as a quoted string instead of a bare value.
    /// Stop codes with anything but digits produce invalid SQL when this is off.
    pub quote_stop_code: bool,
    /// Convert the coordinates from degrees before taking the sine and cosine.
    /// When off the degree values go straight into the trig functions.
    pub convert_to_radians: bool,
}

/// Builds the `INSERT` for one stop, newline included.
pub fn insert_statement(stop: &BusStop, options: SqlOptions) -> String {
    let road = escape_sql_literal(&stop.road_name);
    let description = escape_sql_literal(&stop.description);

    let id = if options.quote_stop_code {
        format!("'{}'", escape_sql_literal(&stop.stop_code))
    } else {
        stop.stop_code.clone()
    };

    let (lat, lng) = if options.convert_to_radians {
        (stop.latitude.to_radians(), stop.longitude.to_radians())
    } else {
        (stop.latitude, stop.longitude)
    };

    format!(
        "INSERT INTO BusStop(id,road,description,lat,lng,coslat,sinlat,coslng,sinlng) VALUES ({id},'{road}','{description}',{},{},{},{},{},{});\n",
        stop.latitude,
        stop.longitude,
        lat.cos(),
        lat.sin(),
        lng.cos(),
        lng.sin(),
    )
}

/// Truncates `path` and writes one `INSERT` per stop in the given order.
/// Returns how many statements were written.
///
/// A failed write leaves whatever was written before it in the file.
#[tracing::instrument(err, skip(stops), fields(count = stops.len()))]
pub async fn write_bus_stops(
    stops: &[BusStop],
    path: &Path,
    options: SqlOptions,
) -> Result<usize, ExportError> {
    let file = File::create(path)
        .await
        .map_err(|source| ExportError::Create {
            path: path.to_path_buf(),
            source,
        })?;
    let mut writer = BufWriter::new(file);

    async {
        for stop in stops {
            writer
                .write_all(insert_statement(stop, options).as_bytes())
                .await
                .map_err(|source| ExportError::Write {
                    stop_code: stop.stop_code.clone(),
                    source,
                })?;
        }

        writer.flush().await.map_err(|source| ExportError::Flush {
            path: path.to_path_buf(),
            source,
        })
    }
    .instrument(info_span!("Writing insert statements"))
    .await?;

    info!("wrote {} bus stops to {}", stops.len(), path.display());

    Ok(stops.len())
}

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("couldn't create {} \n{source}", path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error writing bus stop {stop_code} \n{source}")]
    Write {
        stop_code: String,
        source: std::io::Error,
    },

    #[error("error flushing {} \n{source}", path.display())]
    Flush {
        path: PathBuf,
        source: std::io::Error,
    },
}

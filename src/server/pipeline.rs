use tracing::info;

use crate::codec;
use crate::detection::{self, DetectedRegion};
use crate::inpaint::{self, InpaintRect};

use super::error::ServerError;
use super::state::ServerState;

pub(crate) fn detect(
    state: &ServerState,
    bytes: &[u8],
) -> Result<Vec<DetectedRegion>, ServerError> {
    let image = codec::decode_rgb(bytes)
        .map_err(|err| ServerError::bad_request(format!("{:#}", err)))?;
    let regions = detection::detect_regions(state.engine.as_ref(), &state.analyzer, &image)?;
    info!(
        width = image.width(),
        height = image.height(),
        regions = regions.len(),
        "detect finished"
    );
    Ok(regions)
}

pub(crate) fn inpaint(
    state: &ServerState,
    bytes: &[u8],
    rect: &InpaintRect,
) -> Result<Vec<u8>, ServerError> {
    let image = codec::decode_rgb(bytes)
        .map_err(|err| ServerError::bad_request(format!("{:#}", err)))?;
    let output = inpaint::erase_region(&image, rect, state.inpaint);
    let png = codec::encode_png(&output)?;
    info!(
        width = output.width(),
        height = output.height(),
        ?rect,
        bytes = png.len(),
        "inpaint finished"
    );
    Ok(png)
}

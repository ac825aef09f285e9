//! Native X11 RandR detection strategy.
//!
//! Connects directly to the X server and walks the RandR output list,
//! keeping only outputs the server marks as actively connected. The
//! connection lives for the duration of one `enumerate` call; dropping
//! it releases the socket on every exit path.

use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::randr::{self, ConnectionExt as _};

use super::{DetectError, Detector, RawDisplays};

/// Detector backed by the X server's RandR extension.
pub struct NativeDetector {
    display: String,
}

impl NativeDetector {
    /// `display` is the X display target, e.g. `:0`.
    pub fn new(display: impl Into<String>) -> Self {
        Self {
            display: display.into(),
        }
    }
}

impl Detector for NativeDetector {
    fn enumerate(&self) -> Result<RawDisplays, DetectError> {
        let (conn, screen_num) =
            x11rb::connect(Some(self.display.as_str())).map_err(|source| DetectError::Connect {
                display: self.display.clone(),
                source,
            })?;
        let root = conn.setup().roots[screen_num].root;

        let resources = conn.randr_get_screen_resources(root)?.reply()?;

        // Collect connected outputs in server enumeration order. An
        // output whose info query fails is treated as absent rather
        // than aborting the whole enumeration.
        let mut connected: Vec<(randr::Output, String)> = Vec::new();
        for &output in &resources.outputs {
            let info = match conn.randr_get_output_info(output, resources.config_timestamp) {
                Ok(cookie) => match cookie.reply() {
                    Ok(info) => info,
                    Err(err) => {
                        debug!("skipping output {output}: reply failed: {err}");
                        continue;
                    }
                },
                Err(err) => {
                    debug!("skipping output {output}: request failed: {err}");
                    continue;
                }
            };
            if info.connection == randr::Connection::CONNECTED {
                connected.push((output, String::from_utf8_lossy(&info.name).into_owned()));
            }
        }

        // One primary query after the walk is enough; the server's
        // designation is per-screen, not per-output.
        let designated = match conn.randr_get_output_primary(root)?.reply() {
            Ok(reply) => Some(reply.output),
            Err(err) => {
                debug!("primary output query failed: {err}");
                None
            }
        };

        let raw = normalize(connected, designated);
        debug!(
            "native detection on {}: {:?}, primary hint {:?}",
            self.display, raw.outputs, raw.primary_hint
        );
        Ok(raw)
    }
}

/// Turn the connected-output walk into a raw display list: resolve the
/// server's primary designation against the collected outputs (falling
/// back to the first connected output in server order), then sort the
/// names lexicographically so downstream ordering does not depend on
/// server enumeration order.
fn normalize(connected: Vec<(randr::Output, String)>, designated: Option<randr::Output>) -> RawDisplays {
    let primary_hint = designated
        .and_then(|primary| {
            connected
                .iter()
                .find(|(output, _)| *output == primary)
                .map(|(_, name)| name.clone())
        })
        .or_else(|| connected.first().map(|(_, name)| name.clone()));

    let mut outputs: Vec<String> = connected.into_iter().map(|(_, name)| name).collect();
    outputs.sort();

    RawDisplays {
        outputs,
        primary_hint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected(pairs: &[(u32, &str)]) -> Vec<(randr::Output, String)> {
        pairs.iter().map(|&(id, name)| (id, name.to_string())).collect()
    }

    #[test]
    fn outputs_are_sorted_lexicographically() {
        // Counterpart to the command strategy test: native output order
        // is normalized, command order is not.
        let raw = normalize(connected(&[(7, "HDMI-1"), (3, "DP-1"), (5, "eDP-1")]), None);
        assert_eq!(raw.outputs, vec!["DP-1", "HDMI-1", "eDP-1"]);
    }

    #[test]
    fn designated_primary_becomes_the_hint() {
        let raw = normalize(connected(&[(7, "HDMI-1"), (3, "DP-1")]), Some(3));
        assert_eq!(raw.primary_hint.as_deref(), Some("DP-1"));
    }

    #[test]
    fn hint_falls_back_to_first_connected_in_server_order() {
        // Server order, not sorted order: HDMI-1 was enumerated first.
        let raw = normalize(connected(&[(7, "HDMI-1"), (3, "DP-1")]), None);
        assert_eq!(raw.primary_hint.as_deref(), Some("HDMI-1"));
    }

    #[test]
    fn designation_for_an_unconnected_output_falls_back() {
        let raw = normalize(connected(&[(7, "HDMI-1")]), Some(99));
        assert_eq!(raw.primary_hint.as_deref(), Some("HDMI-1"));
    }

    #[test]
    fn no_connected_outputs_means_no_hint() {
        let raw = normalize(Vec::new(), None);
        assert!(raw.outputs.is_empty());
        assert_eq!(raw.primary_hint, None);
    }
}

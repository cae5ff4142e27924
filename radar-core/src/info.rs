use crate::error::FrameError;

/// Companion to the framebuffer: the precipitation snapshot time and the
/// caption drawn on the panel. Stored as `key=value` lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    /// Unix seconds of the precipitation snapshot.
    pub precip_ts: i64,
    pub text: String,
}

impl ImageInfo {
    pub fn to_text(&self) -> String {
        let text = self.text.replace(['\r', '\n'], " ");
        format!("precip_ts={}\ntext={}\n", self.precip_ts, text)
    }

    /// Parse `key=value` lines. Unknown keys are ignored.
    pub fn parse(s: &str) -> Result<Self, FrameError> {
        let mut precip_ts = None;
        let mut text = None;

        for line in s.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            match key.trim() {
                "precip_ts" => {
                    let ts = value.trim().parse::<i64>().map_err(|e| {
                        FrameError::InvalidInfo(format!("precip_ts {value:?}: {e}"))
                    })?;
                    precip_ts = Some(ts);
                }
                "text" => text = Some(value.to_string()),
                _ => {}
            }
        }

        Ok(Self {
            precip_ts: precip_ts.ok_or_else(|| FrameError::InvalidInfo("missing precip_ts".into()))?,
            text: text.ok_or_else(|| FrameError::InvalidInfo("missing text".into()))?,
        })
    }
}

use anyhow::{Context, Result};
use tracing::info;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConnectionExt, Window};
use x11rb::rust_connection::RustConnection;

/// Synchronous pointer position query in overlay-local pixels
pub trait PointerSource {
    fn position(&self) -> Result<(f64, f64)>;
}

/// Pointer and display geometry from the X server
///
/// The overlay covers the whole screen, so root-window coordinates are
/// already overlay-local.
pub struct X11Pointer {
    conn: RustConnection,
    root: Window,
    width: u16,
    height: u16,
}

impl X11Pointer {
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X11 display")?;
        let screen = &conn.setup().roots[screen_num];
        let (root, width, height) = (screen.root, screen.width_in_pixels, screen.height_in_pixels);
        info!(screen = screen_num, width = width, height = height, "Connected to X11");
        Ok(Self { conn, root, width, height })
    }

    pub fn screen_size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    /// Re-read the root window geometry (picks up RandR resolution changes)
    pub fn refresh_screen_size(&mut self) -> Result<(u32, u32)> {
        let geometry = self
            .conn
            .get_geometry(self.root)
            .context("Failed to send GetGeometry request")?
            .reply()
            .context("Failed to get reply for GetGeometry")?;
        self.width = geometry.width;
        self.height = geometry.height;
        Ok(self.screen_size())
    }
}

impl PointerSource for X11Pointer {
    fn position(&self) -> Result<(f64, f64)> {
        let reply = self
            .conn
            .query_pointer(self.root)
            .context("Failed to send QueryPointer request")?
            .reply()
            .context("Failed to get reply for QueryPointer")?;
        Ok((f64::from(reply.root_x), f64::from(reply.root_y)))
    }
}

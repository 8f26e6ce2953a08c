use std::sync::mpsc::{self, Sender};
use std::thread;
use tokio::sync::oneshot;

use crate::drag::Position;
use crate::export::ExportArtifact;
use crate::input::PointerEvent;
use crate::scene::Scene;
use crate::text::StampedText;
use crate::{EditorConfig, Error, Rasterizer, Result};

enum Command {
    Pointer(PointerEvent, oneshot::Sender<Position>),
    SetDraft(String, oneshot::Sender<()>),
    Commit(oneshot::Sender<StampedText>),
    SelectBackground(String, oneshot::Sender<bool>),
    Snapshot(oneshot::Sender<Scene>),
    Export(Option<String>, oneshot::Sender<Result<ExportArtifact>>),
    Close(oneshot::Sender<()>),
}

/// An async-friendly editor abstraction backed by a dedicated worker
/// thread.
///
/// The worker thread owns a synchronous `CardEditor` and its rasterizer
/// and executes commands sent from async tasks, so callers get an async
/// interface without the editor needing to be `Send` across threads.
/// Because every command drains through one channel, exports are also
/// serialized structurally: a second export queues behind the first
/// instead of racing it.
#[derive(Clone)]
pub struct Studio {
    cmd_tx: Sender<Command>,
}

impl Studio {
    /// Create a studio with the default rasterizer backend.
    #[cfg(feature = "soft-raster")]
    pub async fn new(config: Option<EditorConfig>) -> Result<Self> {
        Self::with_rasterizer(config, crate::raster::SoftRasterizer::new()).await
    }

    /// Create a studio around a caller-provided rasterizer backend
    /// (spawns a background thread that owns the editor).
    pub async fn with_rasterizer<R>(config: Option<EditorConfig>, mut raster: R) -> Result<Self>
    where
        R: Rasterizer + Send + 'static,
    {
        let config = config.unwrap_or_default();

        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx): (oneshot::Sender<Result<()>>, oneshot::Receiver<Result<()>>) =
            oneshot::channel();

        thread::spawn(move || {
            // Initialize the editor on the worker thread
            let mut editor = match crate::editor::CardEditor::new(config) {
                Ok(e) => e,
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };

            let _ = init_tx.send(Ok(()));

            // Command loop
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::Pointer(event, resp) => {
                        editor.handle_pointer(event);
                        let _ = resp.send(editor.position());
                    }
                    Command::SetDraft(text, resp) => {
                        editor.set_draft(text);
                        let _ = resp.send(());
                    }
                    Command::Commit(resp) => {
                        let stamp = editor.commit().clone();
                        let _ = resp.send(stamp);
                    }
                    Command::SelectBackground(reference, resp) => {
                        let _ = resp.send(editor.select_background(&reference));
                    }
                    Command::Snapshot(resp) => {
                        let _ = resp.send(editor.scene());
                    }
                    Command::Export(path_opt, resp) => {
                        let res = editor.export_as_image(&mut raster);
                        // If a path is provided, also write to disk
                        if let Ok(ref artifact) = res {
                            if let Some(path) = path_opt {
                                if let Err(e) = artifact.write_to(&path) {
                                    log::warn!("Failed to write {}: {}", path, e);
                                }
                            }
                        }
                        let _ = resp.send(res);
                    }
                    Command::Close(resp) => {
                        let _ = resp.send(());
                        break;
                    }
                }
            }
        });

        // Wait for the worker to report initialization success or failure
        let init_res = init_rx
            .await
            .map_err(|e| Error::Other(format!("Worker init canceled: {}", e)))?;
        init_res?;

        Ok(Self { cmd_tx })
    }

    /// Feed one input event; resolves to the overlay position after the
    /// event has been applied.
    pub async fn pointer(&self, event: PointerEvent) -> Result<Position> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Pointer(event, tx));
        rx.await
            .map_err(|e| Error::Other(format!("Pointer canceled: {}", e)))
    }

    pub async fn set_draft(&self, text: &str) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::SetDraft(text.to_string(), tx));
        rx.await
            .map_err(|e| Error::Other(format!("SetDraft canceled: {}", e)))
    }

    /// Stamp the draft at the current overlay position.
    pub async fn commit(&self) -> Result<StampedText> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Commit(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Commit canceled: {}", e)))
    }

    /// Select a background by id or exact url; resolves to whether the
    /// reference matched.
    pub async fn select_background(&self, reference: &str) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        let _ = self
            .cmd_tx
            .send(Command::SelectBackground(reference.to_string(), tx));
        rx.await
            .map_err(|e| Error::Other(format!("SelectBackground canceled: {}", e)))
    }

    /// Snapshot the renderable scene.
    pub async fn scene(&self) -> Result<Scene> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Snapshot(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Snapshot canceled: {}", e)))
    }

    /// Export the card; if `path` is Some, the bytes are also saved there.
    pub async fn export(&self, path: Option<&str>) -> Result<ExportArtifact> {
        let (tx, rx) = oneshot::channel();
        let path_opt = path.map(|s| s.to_string());
        let _ = self.cmd_tx.send(Command::Export(path_opt, tx));
        rx.await
            .map_err(|e| Error::Other(format!("Export canceled: {}", e)))?
    }

    /// Shutdown the background worker.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Close(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))
    }
}

#[cfg(all(test, feature = "soft-raster"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn studio_drives_a_full_session() {
        let studio = Studio::new(None).await.expect("studio init");

        studio
            .pointer(PointerEvent::MouseDown)
            .await
            .expect("down");
        let pos = studio
            .pointer(PointerEvent::MouseMove { dx: 20.0, dy: 10.0 })
            .await
            .expect("move");
        assert_eq!(pos, Position::new(120.0, 110.0));
        studio.pointer(PointerEvent::MouseUp).await.expect("up");

        studio.set_draft("From async land").await.expect("draft");
        let stamp = studio.commit().await.expect("commit");
        assert_eq!(stamp.text, "From async land");
        assert_eq!(stamp.position, Position::new(120.0, 110.0));

        assert!(studio.select_background("lagoon").await.expect("select"));

        let artifact = studio.export(None).await.expect("export");
        assert_eq!(artifact.filename, "export.png");
        assert!(!artifact.is_empty());

        // Export settled: the stamp layer is cleared again.
        let scene = studio.scene().await.expect("scene");
        assert!(scene.stamps.is_empty());
        assert!(scene.overlay.is_some());

        studio.close().await.expect("close");
    }

    #[tokio::test]
    async fn studio_rejects_invalid_config() {
        let config = EditorConfig {
            scale_search_passes: 0,
            ..Default::default()
        };
        let res = Studio::new(Some(config)).await;
        assert!(res.is_err());
    }
}

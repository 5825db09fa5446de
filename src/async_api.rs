use crate::cdp::CdpExporter;
use crate::export::{ExportConfig, PdfExporter};
use crate::model::Magazine;
use crate::{Error, RenderConfig, Result};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread;
use tokio::sync::oneshot;

enum Command {
    Export(Box<Magazine>, RenderConfig, oneshot::Sender<Result<Vec<u8>>>),
    ExportToFile(Box<Magazine>, RenderConfig, PathBuf, oneshot::Sender<Result<usize>>),
    Close(oneshot::Sender<Result<()>>),
}

/// An async-friendly PDF exporter backed by a dedicated worker thread.
///
/// The worker thread owns the synchronous `CdpExporter` (and with it the
/// browser) and runs export jobs sent from async tasks one at a time, so
/// callers get an async interface without the browser handle having to be
/// `Send` across tasks.
#[derive(Clone)]
pub struct Exporter {
    cmd_tx: Sender<Command>,
}

impl Exporter {
    /// Launch the browser on a background thread.
    pub async fn new(config: Option<ExportConfig>) -> Result<Self> {
        let config = config.unwrap_or_default();

        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx): (oneshot::Sender<Result<()>>, oneshot::Receiver<Result<()>>) = oneshot::channel();

        thread::spawn(move || {
            let mut exporter = match CdpExporter::new(config) {
                Ok(e) => e,
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };

            let _ = init_tx.send(Ok(()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::Export(magazine, render, resp) => {
                        let res = exporter.export(&magazine, &render);
                        let _ = resp.send(res);
                    }
                    Command::ExportToFile(magazine, render, path, resp) => {
                        let res = crate::export::export_to_file(&mut exporter, &magazine, &render, path);
                        let _ = resp.send(res);
                    }
                    Command::Close(resp) => {
                        let res = exporter.close();
                        let _ = resp.send(res);
                        break;
                    }
                }
            }
        });

        // Wait for the worker to report launch success or failure
        init_rx
            .await
            .map_err(|e| Error::ExportError(format!("Worker init canceled: {}", e)))??;

        Ok(Self { cmd_tx })
    }

    /// Render, fit and print `magazine`; returns the PDF bytes.
    pub async fn export(&self, magazine: &Magazine, config: &RenderConfig) -> Result<Vec<u8>> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Export(Box::new(magazine.clone()), config.clone(), tx))?;
        rx.await
            .map_err(|e| Error::ExportError(format!("Export canceled: {}", e)))?
    }

    /// Export and write the PDF to `path`; returns the number of bytes written.
    pub async fn export_to_file(
        &self,
        magazine: &Magazine,
        config: &RenderConfig,
        path: impl Into<PathBuf>,
    ) -> Result<usize> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::ExportToFile(
            Box::new(magazine.clone()),
            config.clone(),
            path.into(),
            tx,
        ))?;
        rx.await
            .map_err(|e| Error::ExportError(format!("Export canceled: {}", e)))?
    }

    /// Shut down the worker and close the browser.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Close(tx))?;
        rx.await
            .map_err(|e| Error::ExportError(format!("Close canceled: {}", e)))?
    }

    fn send(&self, cmd: Command) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| Error::ExportError("export worker has shut down".into()))
    }
}

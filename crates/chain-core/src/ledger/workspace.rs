use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

/// Carpeta de trabajo exclusiva de una ejecución: `<root>/<status_key>/temp`.
///
/// Se crea antes de ejecutar y se elimina completa al soltar el guard, en
/// cualquier camino de salida (respuesta normal, error o panic).
#[derive(Debug)]
pub struct RunWorkspace {
    run_folder: PathBuf,
    temp_folder: PathBuf,
}

/// Una clave de estado sólo puede nombrar una carpeta directa de la raíz de
/// trabajo: no vacía, distinta de `.` y `..`, sin separadores de ruta.
pub fn is_valid_status_key(status_key: &str) -> bool {
    !status_key.is_empty()
    && status_key != "."
    && status_key != ".."
    && !status_key.contains(['/', '\\', ':', '\0'])
}

impl RunWorkspace {
    pub fn create(working_root: &Path, status_key: &str) -> io::Result<Self> {
        if !is_valid_status_key(status_key) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("invalid status key: {status_key:?}")));
        }
        let run_folder = working_root.join(status_key);
        let temp_folder = run_folder.join("temp");
        fs::create_dir_all(&temp_folder)?;
        debug!("workspace creado en {}", run_folder.display());
        Ok(Self { run_folder,
                  temp_folder })
    }

    pub fn run_folder(&self) -> &Path {
        &self.run_folder
    }

    pub fn temp_folder(&self) -> &Path {
        &self.temp_folder
    }
}

impl Drop for RunWorkspace {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.run_folder) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("no se pudo eliminar el workspace {}: {}", self.run_folder.display(), e);
            }
        }
    }
}

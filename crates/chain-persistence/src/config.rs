//! Configuración de rutas del proyecto desde variables de entorno.
//! Convención: `CHAIN_PROJECT_PATH`, `CHAIN_HISTORY_PATH`, `CHAIN_WORKING_ROOT`.

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Raíz del proyecto: contiene `algorithms/` y `chains/` o `chains.json`.
    pub project_path: PathBuf,
    /// Carpeta donde se escriben los historiales.
    pub history_path: PathBuf,
    /// Raíz de las carpetas de trabajo por ejecución.
    pub working_root: PathBuf,
}

impl ChainConfig {
    pub fn from_env() -> Self {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);
        let project_path = non_empty("CHAIN_PROJECT_PATH").unwrap_or_else(|| PathBuf::from("."));
        let history_path = non_empty("CHAIN_HISTORY_PATH").unwrap_or_else(|| project_path.join("history"));
        let working_root = non_empty("CHAIN_WORKING_ROOT").unwrap_or_else(|| env::temp_dir().join("algochain"));
        Self { project_path,
               history_path,
               working_root }
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_derive_from_project_path() {
        let vars: HashMap<&str, &str> = [("CHAIN_PROJECT_PATH", "/srv/proj"), ("CHAIN_HISTORY_PATH", "")].into();
        let cfg = ChainConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.project_path, PathBuf::from("/srv/proj"));
        assert_eq!(cfg.history_path, PathBuf::from("/srv/proj/history"));
        assert_eq!(cfg.working_root, env::temp_dir().join("algochain"));
    }

    #[test]
    fn explicit_values_win() {
        let cfg = ChainConfig::from_lookup(|k| match k {
                                               "CHAIN_HISTORY_PATH" => Some("/h".into()),
                                               "CHAIN_WORKING_ROOT" => Some("/w".into()),
                                               _ => None,
                                           });
        assert_eq!(cfg.project_path, PathBuf::from("."));
        assert_eq!(cfg.history_path, PathBuf::from("/h"));
        assert_eq!(cfg.working_root, PathBuf::from("/w"));
    }
}

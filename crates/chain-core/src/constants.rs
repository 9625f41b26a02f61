//! Constantes del motor de cadenas.
//!
//! Agrupa claves reservadas del ledger y mensajes estables que forman parte
//! del contrato observable (respuestas y archivos de historial). Cambiarlos
//! rompe a los consumidores que leen esos artefactos.

/// Clave de metadata que el último algoritmo usa para fijar la respuesta final.
pub const CHAIN_OUTPUT_KEY: &str = "chain_output_value";

/// Valor que sustituye a cualquier entrada no serializable a JSON.
pub const NOT_SERIALIZABLE: &str = "Value not JSON serializable";

/// Texto de la respuesta por defecto cuando ningún algoritmo fija salida.
pub const CHAIN_COMPLETE_MESSAGE: &str = "Chain run complete.";

/// Mensaje de la respuesta de error para fallos de validación.
pub const PARAMETER_ERROR_MESSAGE: &str = "Error in parameters";

/// Mensaje devuelto cuando un batch se cancela entre iteraciones.
pub const BATCH_CANCELLED_MESSAGE: &str = "Batch job cancelled";

/// Separador entre nombre de algoritmo y parámetro en `iter_param`.
pub const BATCH_PARAM_SEPARATOR: &str = "__";

/// Prefijo del archivo agregado de un batch.
pub const BATCH_FILE_PREFIX: &str = "batch_";

/// Separador del transcript acumulado de estado.
pub const STATUS_MESSAGE_SEPARATOR: &str = "  \n";

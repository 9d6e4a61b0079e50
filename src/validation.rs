use crate::models::VoterRequest;

/// validate
///
/// Pure field validation for the voter payload. Checks that each of the four
/// business fields is present and meets its minimum trimmed length.
///
/// Returns one message per failing field, always in field order
/// (nombre, cedula, telefono, municipio); an empty vec means the payload passed.
/// The caller rejects failing requests with a 400 carrying the full list.
pub fn validate(req: &VoterRequest) -> Vec<String> {
    let mut errors = Vec::new();
    if !meets_min_len(req.nombre.as_deref(), 2) {
        errors.push("Nombre inválido".to_string());
    }
    if !meets_min_len(req.cedula.as_deref(), 4) {
        errors.push("Cédula inválida".to_string());
    }
    if !meets_min_len(req.telefono.as_deref(), 6) {
        errors.push("Teléfono inválido".to_string());
    }
    if !meets_min_len(req.municipio.as_deref(), 2) {
        errors.push("Municipio inválido".to_string());
    }
    errors
}

/// A field passes when it is present and its trimmed character count reaches `min`.
fn meets_min_len(value: Option<&str>, min: usize) -> bool {
    value
        .map(|v| v.trim().chars().count() >= min)
        .unwrap_or(false)
}

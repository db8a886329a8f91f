use std::time::{Duration, Instant};

/// Status phrases shown while a reply is being generated, in display order.
pub const LOADING_STEPS: [&str; 5] = [
    "📄 Leyendo documentación del contexto...",
    "🔍 Localizando tablas y artículos aplicables...",
    "📐 Verificando fórmulas de cálculo...",
    "✍️ Redactando justificación técnica detallada...",
    "📊 Maquetando informe de memoria (Formato A4)...",
];

/// Interval between phrase advances.
pub const STEP_INTERVAL: Duration = Duration::from_millis(2500);

/// Cycles through the loading phrases while a send is in flight.
///
/// Pull-based: the shell calls `current()` whenever it redraws. The phrase
/// is a pure function of elapsed time since `start()`, clamped at the last
/// step, so there is no timer task to cancel or leak — `stop()` resets to
/// the first phrase deterministically.
#[derive(Debug, Default)]
pub struct LoadingStatus {
    started_at: Option<Instant>,
}

impl LoadingStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn stop(&mut self) {
        self.started_at = None;
    }

    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    /// Phrase for the current instant. Idle status reads as the first phrase.
    pub fn current(&self) -> &'static str {
        let Some(started) = self.started_at else {
            return LOADING_STEPS[0];
        };
        let step = (started.elapsed().as_millis() / STEP_INTERVAL.as_millis()) as usize;
        LOADING_STEPS[step.min(LOADING_STEPS.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_shows_first_phrase() {
        let status = LoadingStatus::new();
        assert!(!status.is_active());
        assert_eq!(status.current(), LOADING_STEPS[0]);
    }

    #[test]
    fn test_phrases_advance_with_elapsed_time() {
        let mut status = LoadingStatus::new();
        status.start();
        assert_eq!(status.current(), LOADING_STEPS[0]);

        status.started_at = Some(Instant::now() - STEP_INTERVAL);
        assert_eq!(status.current(), LOADING_STEPS[1]);

        status.started_at = Some(Instant::now() - STEP_INTERVAL * 3);
        assert_eq!(status.current(), LOADING_STEPS[3]);
    }

    #[test]
    fn test_clamps_at_last_phrase() {
        let mut status = LoadingStatus::new();
        status.start();
        status.started_at = Some(Instant::now() - STEP_INTERVAL * 100);
        assert_eq!(status.current(), LOADING_STEPS[4]);
    }

    #[test]
    fn test_stop_resets_to_first_phrase() {
        let mut status = LoadingStatus::new();
        status.start();
        status.started_at = Some(Instant::now() - STEP_INTERVAL * 2);
        status.stop();
        assert!(!status.is_active());
        assert_eq!(status.current(), LOADING_STEPS[0]);
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::provider::{ChatProvider, ProviderError, ProviderRequest, ProviderStream, StreamEvent};
use crate::models::message::Citation;

/// Abridged response used by `SimulatedProvider::demo()`.
const DEMO_RESPONSE: &str = "### 1. IDENTIFICACIÓN REGLAMENTARIA\n\n\
El análisis se centra en el **DB-SE-AE**, apartado 3.5 **Carga de Nieve**.\n\n\
### 2. CÁLCULO\n\n\
$$ q_n = \\mu \\cdot c_e \\cdot s_k = 1{,}0 \\cdot 1{,}0 \\cdot 1{,}0 = 1{,}0 \\text{ kN/m}^2 $$\n\n\
| Parámetro | Valor | Estado |\n| :--- | :--- | :--- |\n\
| $q_n$ | 1,0 kN/m² | ✅ |\n\n\
### 3. DICTAMEN\n\nEl valor de cálculo **CUMPLE** los mínimos normativos de la zona.";

/// Scripted provider: replays a fixed sequence of increments, optionally
/// paced. Stands in for the remote service in tests and offline demos —
/// the descendant of the old compiled-in mock mode, now just another
/// `ChatProvider` a caller injects.
pub struct SimulatedProvider {
    script: Vec<Result<StreamEvent, ProviderError>>,
    /// When set, the whole call fails before any increment is produced.
    fail_to_start: Option<ProviderError>,
    chunk_delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl SimulatedProvider {
    pub fn from_script(script: Vec<Result<StreamEvent, ProviderError>>) -> Self {
        Self {
            script,
            fail_to_start: None,
            chunk_delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Convenience: text chunks followed by one citation batch.
    pub fn streaming_text(chunks: &[&str], citations: Vec<Citation>) -> Self {
        let mut script: Vec<Result<StreamEvent, ProviderError>> = chunks
            .iter()
            .map(|c| Ok(StreamEvent::Text(c.to_string())))
            .collect();
        if !citations.is_empty() {
            script.push(Ok(StreamEvent::Citations(citations)));
        }
        Self::from_script(script)
    }

    /// A provider whose call fails before streaming anything.
    pub fn failing(error: ProviderError) -> Self {
        Self {
            script: Vec::new(),
            fail_to_start: Some(error),
            chunk_delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The canned snow-load demo: grounding citations up front, then the
    /// response text in 8-character chunks, the cadence of the real service.
    pub fn demo() -> Self {
        let mut script: Vec<Result<StreamEvent, ProviderError>> =
            vec![Ok(StreamEvent::Citations(vec![
                Citation {
                    source_uri: "https://www.codigotecnico.org/pdf/Documentos/SE/DB_SE-AE.pdf"
                        .to_string(),
                    title: "DB-SE-AE Acciones en la edificación".to_string(),
                },
                Citation {
                    source_uri: "https://www.boe.es/buscar/act.php?id=BOE-A-2006-5515".to_string(),
                    title: "BOE Código Técnico".to_string(),
                },
            ]))];

        let chars: Vec<char> = DEMO_RESPONSE.chars().collect();
        for chunk in chars.chunks(8) {
            script.push(Ok(StreamEvent::Text(chunk.iter().collect())));
        }

        let mut provider = Self::from_script(script);
        provider.chunk_delay = Some(Duration::from_millis(10));
        provider
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = Some(delay);
        self
    }

    /// How many times `stream` has been invoked.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Shared handle to the call counter, for tests that move the provider
    /// into an `Arc<dyn ChatProvider>`.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl ChatProvider for SimulatedProvider {
    async fn stream(&self, _request: ProviderRequest) -> Result<ProviderStream, ProviderError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        if let Some(error) = &self.fail_to_start {
            return Err(error.clone());
        }

        let script = self.script.clone();
        let delay = self.chunk_delay;

        Ok(Box::pin(async_stream::stream! {
            for item in script {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                let is_err = item.is_err();
                yield item;
                if is_err {
                    return;
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn request() -> ProviderRequest {
        ProviderRequest {
            prompt: "Calcula la carga de nieve".to_string(),
            attachment: None,
            context: crate::models::context::CteContext::DbSeAe,
            history: Vec::new(),
            system_instruction: String::new(),
        }
    }

    #[tokio::test]
    async fn test_replays_script_in_order() {
        let provider = SimulatedProvider::streaming_text(
            &["He", "llo ", "mundo"],
            vec![Citation {
                source_uri: "https://x".to_string(),
                title: "Doc".to_string(),
            }],
        );

        let mut stream = provider.stream(request()).await.unwrap();
        let mut text = String::new();
        let mut citations = 0;
        while let Some(event) = stream.next().await {
            match event.unwrap() {
                StreamEvent::Text(t) => text.push_str(&t),
                StreamEvent::Citations(c) => citations += c.len(),
            }
        }
        assert_eq!(text, "Hello mundo");
        assert_eq!(citations, 1);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mid_stream_error_stops_the_stream() {
        let provider = SimulatedProvider::from_script(vec![
            Ok(StreamEvent::Text("Partial answer".to_string())),
            Err(ProviderError::RateLimited),
            Ok(StreamEvent::Text("never delivered".to_string())),
        ]);

        let mut stream = provider.stream(request()).await.unwrap();
        assert!(matches!(
            stream.next().await,
            Some(Ok(StreamEvent::Text(_)))
        ));
        assert!(matches!(
            stream.next().await,
            Some(Err(ProviderError::RateLimited))
        ));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_failing_provider_rejects_before_streaming() {
        let provider = SimulatedProvider::failing(ProviderError::NotFound);
        assert!(matches!(
            provider.stream(request()).await,
            Err(ProviderError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_demo_reassembles_to_full_response() {
        let provider = SimulatedProvider::demo();
        let mut stream = provider.stream(request()).await.unwrap();
        let mut text = String::new();
        while let Some(event) = stream.next().await {
            if let StreamEvent::Text(t) = event.unwrap() {
                text.push_str(&t);
            }
        }
        assert_eq!(text, DEMO_RESPONSE);
    }
}

//! Prompt construction for the Gemini backend.
//!
//! Each interaction position gets its own prompt: the opening turn
//! asks for symbolic imagery and an open question, the closing turn
//! weaves the whole journey and seals it with a sigil, intermediate
//! turns keep the dialogue going. The free-writing seed has a separate
//! echo prompt. All prompts demand a bare JSON object back; salvage of
//! sloppy model output happens in [`super::extract`].

use serde::Serialize;

use prometheus_core::chat::ChatRequest;
use prometheus_core::seeds::{Seed, FREE_WRITING_SEED_ID};

/// The interaction number of the closing turn for regular seeds
/// (sessions run two turns, numbered 0 and 1).
pub const CLOSING_INTERACTION: u32 = 1;

/// Question used as prior context when the opening turn produced none.
const FALLBACK_OPENING_QUESTION: &str =
    "Quale voce antica sussurra nel silenzio tra un passo e l'altro?";

/// Which prompt a request calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// First turn of a regular seed.
    Opening,
    /// A middle turn (free-writing seeds never close).
    Intermediate,
    /// Final turn of a regular seed; asks for the sigil.
    Closing,
    /// Echo request for the free-writing seed.
    FreeWritingEcho,
}

/// Sampling parameters sent alongside a prompt.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GenerationConfig {
    pub temperature: f32,
    #[serde(rename = "topP")]
    pub top_p: f32,
    #[serde(rename = "maxOutputTokens")]
    pub max_output_tokens: u32,
}

/// Classify a request by interaction position.
pub fn prompt_kind(request: &ChatRequest) -> PromptKind {
    if request.seed_id == FREE_WRITING_SEED_ID && request.is_eco_request {
        PromptKind::FreeWritingEcho
    } else if request.interaction_number == 0 {
        PromptKind::Opening
    } else if request.seed_id != FREE_WRITING_SEED_ID
        && request.interaction_number == CLOSING_INTERACTION
    {
        PromptKind::Closing
    } else {
        PromptKind::Intermediate
    }
}

/// Sampling parameters per prompt kind. The echo prompt wants short,
/// cooler output; everything else gets the full budget.
pub fn generation_config(kind: PromptKind) -> GenerationConfig {
    match kind {
        PromptKind::FreeWritingEcho => GenerationConfig {
            temperature: 0.7,
            top_p: 0.8,
            max_output_tokens: 300,
        },
        _ => GenerationConfig {
            temperature: 0.88,
            top_p: 0.9,
            max_output_tokens: 700,
        },
    }
}

/// Build the full prompt for a request.
pub fn build_prompt(request: &ChatRequest, seed: &Seed) -> String {
    match prompt_kind(request) {
        PromptKind::Opening => opening_prompt(request, seed),
        PromptKind::Intermediate => intermediate_prompt(request, seed),
        PromptKind::Closing => closing_prompt(request, seed),
        PromptKind::FreeWritingEcho => echo_prompt(request, seed),
    }
}

// ---------------------------------------------------------------------------
// Conversation context helpers
// ---------------------------------------------------------------------------

/// The user's previous reflection, falling back to the current input
/// when the history carries none.
fn previous_user_input(request: &ChatRequest) -> String {
    match request.history.last() {
        Some(turn) if turn.0 == "user" => turn.1.joined("\n"),
        _ => request.user_input.clone(),
    }
}

/// The symbolic output of the opening turn, if the history has it.
fn opening_assistant_output(request: &ChatRequest) -> String {
    match request.history.first() {
        Some(turn) if turn.0 == "assistant" => turn.1.joined("\n"),
        _ => String::new(),
    }
}

fn last_question(request: &ChatRequest) -> &str {
    request
        .last_assistant_question
        .as_deref()
        .unwrap_or(FALLBACK_OPENING_QUESTION)
}

// ---------------------------------------------------------------------------
// Prompt bodies
// ---------------------------------------------------------------------------

fn opening_prompt(request: &ChatRequest, seed: &Seed) -> String {
    format!(
        r#"**Ruolo:** Sei un'eco simbolica di Prometheus, un riflettore di paesaggi interiori. Trasforma le parole dell'utente in un'immagine che rivela la sua esperienza profonda.

Tema: {seed_id} - {seed_name}
Input dell'utente: {user_input}

**Processo:**
1. Cogli il nucleo emotivo e gli elementi specifici della narrazione dell'utente.
2. Genera una o due immagini metaforiche per "output", ancorate agli elementi chiave dell'input, non descrizioni generiche.
3. Per "eco", una singola frase breve basata su una parola chiave emotiva dell'input.
4. "frase_finale" deve essere una domanda aperta e profonda che emerga dalle immagini create. Deve terminare con un punto interrogativo.

**FORMATO DI RISPOSTA OBBLIGATORIO: rispondi UNICAMENTE con un oggetto JSON valido, senza testo aggiuntivo prima o dopo.**

JSON:
{{
    "output": ["una o due immagini simboliche ancorate all'input dell'utente"],
    "eco": ["eco breve in una singola frase"],
    "frase_finale": "domanda che stimola l'auto-riflessione?"
}}"#,
        seed_id = request.seed_id,
        seed_name = seed.name,
        user_input = request.user_input,
    )
}

fn intermediate_prompt(request: &ChatRequest, seed: &Seed) -> String {
    format!(
        r#"**Ruolo:** Continua il tuo ruolo di eco simbolica di Prometheus. Rispondi all'ultima riflessione dell'utente mantenendo il tono poetico.

Tema: {seed_id} - {seed_name}
Contesto precedente: {context}
Domanda precedente di Prometheus: {question}
Nuova riflessione dell'utente: {user_input}

**Processo:**
1. "output": un'immagine metaforica o breve riflessione poetica che riprenda la nuova riflessione e la connetta al seme. Niente risposte dirette.
2. "eco": una singola frase breve.
3. "frase_finale": una nuova domanda aperta che stimoli un'ulteriore riflessione. Deve terminare con un punto interrogativo.

**FORMATO DI RISPOSTA OBBLIGATORIO: rispondi UNICAMENTE con un oggetto JSON valido, senza testo aggiuntivo prima o dopo.**

JSON:
{{
    "output": "immagine metaforica o riflessione poetica (singola stringa)",
    "eco": ["eco breve e conciso"],
    "frase_finale": "nuova domanda stimolante?"
}}"#,
        seed_id = request.seed_id,
        seed_name = seed.name,
        context = opening_assistant_output(request),
        question = last_question(request),
        user_input = request.user_input,
    )
}

fn closing_prompt(request: &ChatRequest, seed: &Seed) -> String {
    format!(
        r##"**Ruolo:** Tessi la narrazione dell'utente, unendo le riflessioni precedenti con le nuove consapevolezze, in un'immagine finale che suggelli il suo viaggio interiore.

Tema: {seed_id} - {seed_name}
Prima riflessione dell'utente: {previous}
Domanda di Prometheus: {question}
Risposta attuale dell'utente: {user_input}
Contesto simbolico precedente: {context}

**Processo:**
1. "output": un testo poetico di 10-12 frasi che sia metafora del percorso: integra la scelta originaria, la scoperta inaspettata e il senso attuale. Suggerisci con immagini, non affermare.
2. "eco": una singola frase densa, apice simbolico del percorso.
3. "frase_finale": frase conclusiva evocativa che chiude il cerchio. NON deve terminare con un punto interrogativo.
4. "sigillo": genera i dati del sigillo finale per questo seme.

**FORMATO DI RISPOSTA OBBLIGATORIO: rispondi UNICAMENTE con un oggetto JSON valido, senza testo aggiuntivo prima o dopo.**

JSON:
{{
    "output": "testo poetico del percorso (singola stringa fluida)",
    "eco": ["eco simbolico finale"],
    "frase_finale": "frase conclusiva evocativa",
    "sigillo": {{
        "simbolo_dominante": "emoji",
        "immagine": "descrizione metaforica",
        "colore": "#XXXXXX",
        "forma": "forma del sigillo",
        "codice_sigillo": "CODICE-ESEMPIO"
    }}
}}"##,
        seed_id = request.seed_id,
        seed_name = seed.name,
        previous = previous_user_input(request),
        question = last_question(request),
        user_input = request.user_input,
        context = opening_assistant_output(request),
    )
}

fn echo_prompt(request: &ChatRequest, seed: &Seed) -> String {
    format!(
        r##"**Ruolo:** Sei un'eco silenziosa e un custode di simboli. Analizza il testo fornito dall'utente.

**Compito:**
1. Genera una singola frase poetica che risuoni con il tono e i temi del testo. Questa sarà l'eco.
2. Genera i dati per un "sigillo" basato sul testo: simbolo_dominante (emoji), immagine (descrizione metaforica), colore (#RRGGBB), forma, codice_sigillo (alfanumerico univoco).

**Input dell'utente:** "{user_input}"

**FORMATO DI RISPOSTA OBBLIGATORIO: rispondi UNICAMENTE con un oggetto JSON valido, senza testo aggiuntivo prima o dopo.**

JSON:
{{
    "output": "",
    "eco": ["la singola frase poetica di eco"],
    "frase_finale": "{closing_phrase}",
    "sigillo": {{
        "simbolo_dominante": "emoji",
        "immagine": "descrizione metaforica",
        "colore": "#XXXXXX",
        "forma": "forma del sigillo",
        "codice_sigillo": "CODICE-ESEMPIO"
    }}
}}"##,
        user_input = request.user_input,
        closing_phrase = if seed.closing_phrase.is_empty() {
            "La verità si manifesta nella scrittura libera."
        } else {
            seed.closing_phrase.as_str()
        },
    )
}

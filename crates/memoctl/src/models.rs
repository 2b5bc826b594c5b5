//! Model listing

use memo_common::llm::ModelInfo;

/// Render the models that support `generateContent`, one per line
pub fn render_model_list(models: &[ModelInfo]) -> String {
    let mut out = String::from("Listing available models...\n");
    for model in models.iter().filter(|m| m.supports_generate_content()) {
        out.push_str(&format!("- {} (Display: {})\n", model.name, model.display_name));
    }
    out
}

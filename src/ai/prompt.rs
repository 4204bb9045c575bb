use serde_json::Value;

use crate::models::Trade;

/// Most-recent trades included in a prompt. The store keeps newest first,
/// so the slice is simply the head of the collection.
pub const MAX_PROMPT_TRADES: usize = 20;

/// Formats a trade slice into the natural-language instruction sent to the
/// text-generation API. Internal ids are stripped from the serialized
/// records; they mean nothing to the model.
pub fn build_insight_prompt(trades: &[Trade]) -> Result<String, serde_json::Error> {
    let sample = &trades[..trades.len().min(MAX_PROMPT_TRADES)];

    let mut records = Vec::with_capacity(sample.len());
    for trade in sample {
        let mut value = serde_json::to_value(trade)?;
        if let Value::Object(ref mut map) = value {
            map.remove("id");
        }
        records.push(value);
    }
    let trades_json = serde_json::to_string_pretty(&Value::Array(records))?;

    Ok(format!(
        "Analyze the following trading data of a retail trader and provide concise, \
         actionable insights.\n\
         The trader wants to understand their psychological patterns, strengths, and \
         weaknesses.\n\
         Focus on patterns related to instruments, direction (Long/Short), P&L, and tags.\n\
         For example, do they perform better on certain days, with certain setups (tags), \
         or instruments?\n\
         Provide 3-4 bullet points of key takeaways.\n\n\
         Trading Data:\n{}",
        trades_json
    ))
}

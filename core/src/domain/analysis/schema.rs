use serde_json::json;

/// Returns the JSON schema for ingredient analysis LLM responses
pub fn get_analysis_report_schema() -> serde_json::Value {
    let names = json!({
        "type": "array",
        "items": { "type": "string" }
    });

    json!({
        "type": "object",
        "properties": {
            "healthScore": { "type": "integer" },
            "totalIngredients": { "type": "integer" },
            "categories": {
                "type": "object",
                "properties": {
                    "safe": names,
                    "moderate": names,
                    "highConcern": names
                },
                "required": ["safe", "moderate", "highConcern"]
            },
            "advice": { "type": "string" },
            "warnings": names,
            "details": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "ingredient": { "type": "string" },
                        "risk": {
                            "type": "string",
                            "enum": ["high", "moderate", "low"]
                        },
                        "description": { "type": "string" }
                    },
                    "required": ["ingredient", "risk", "description"]
                }
            }
        },
        "required": [
            "healthScore", "totalIngredients", "categories", "advice", "warnings"
        ]
    })
}

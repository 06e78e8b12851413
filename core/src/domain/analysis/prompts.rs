/// Builds the ingredient analysis prompt for a cleaned label text.
pub fn ingredient_analysis_prompt(ingredient_text: &str) -> String {
    format!(
        r#"You are a food safety expert specializing in packaged food labels for Indian consumers.
Analyze the following ingredient list and provide a health assessment.

INGREDIENT LIST:
{ingredient_text}

Assess the ingredients against FSSAI (Food Safety and Standards Authority of India) regulations and international food safety standards.

Focus on:
- Trans fats and hydrogenated oils
- Artificial colours and preservatives (E-numbers)
- High sodium content and MSG
- Artificial sweeteners and additives
- Allergens and other health risks

Reply with a JSON object of exactly this shape:
{{
  "healthScore": <integer from 1 to 10, 10 is healthiest>,
  "totalIngredients": <number of ingredients identified>,
  "categories": {{
    "safe": ["safe ingredients"],
    "moderate": ["ingredients with moderate health concerns"],
    "highConcern": ["ingredients with high health risks"]
  }},
  "advice": "one sentence consumption recommendation",
  "warnings": ["specific health warnings"],
  "details": [
    {{ "ingredient": "name", "risk": "high|moderate|low", "description": "brief health impact" }}
  ]
}}

Scoring guidance:
- Trans fats are always high concern
- E102, E110, E122, E124, E129 (artificial colours) are moderate to high concern
- E211, E223, E320, E321 (preservatives) are moderate concern
- MSG and high sodium are moderate concern
- Flour, water and salt in normal amounts are safe
- Be strict but fair, and give actionable advice

Return only valid JSON without any additional text or formatting."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_label_text() {
        let prompt = ingredient_analysis_prompt("Water, Sugar, E102");
        assert!(prompt.contains("INGREDIENT LIST:\nWater, Sugar, E102\n"));
        assert!(prompt.contains("\"highConcern\""));
        assert!(prompt.ends_with("Return only valid JSON without any additional text or formatting."));
    }
}

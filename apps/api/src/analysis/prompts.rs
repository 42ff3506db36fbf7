// All AI prompt builders for the Analysis module.

/// Builds the ATS scoring prompt for the attached résumé and target roles.
/// The model is instructed to answer with one JSON object per the feedback
/// schema; the parser still treats the reply as unreliable prose.
pub fn ats_analysis_prompt(roles: &[String]) -> String {
    let roles_formatted = roles.join(", ");
    format!(
        r#"As an advanced ATS analyzer, analyze the resume which is attached and strictly follow the instructions and stick to the attached one and do not deviate and use that as ur rag and analyze for roles: {roles_formatted}.
Calculate the ATS score for each role and provide detailed feedback including strengths, weaknesses, optimization tips, suitable roles, enhancement tips, highlighted companies, detailed report, infographic data, and market insights.
The ATS Score Should be accurate and detailed, and the feedback should be actionable and role-specific.
Provide a detailed JSON response including ALL of the following required fields:

{{
    "ats_feedback": {{
        "name": "<user_name>",
        "email": "<user_email>",
        "<role_name>": {{
            "ats_score": {{
                "overall": <0-100>,
                "by_role_specific_metrics": {{
                    "technical_skills": <0-10>,
                    "soft_skills": <0-10>,
                    "experience_match": <0-10>,
                    "education_match": <0-10>,
                    "industry_knowledge": <0-10>,
                    "leadership_potential": <0-10>,
                    "innovation_score": <0-10>,
                    "communication_skills": <0-10>,
                    "project_execution": <0-10>,
                    "domain_expertise": <0-10>
                }}
            }},
            "strengths": ["list at least 5 detailed strengths"],
            "weaknesses": ["list at least 7 specific weaknesses"],
            "optimization_tips": ["provide at least 7 actionable tips"],
            "top_keywords": ["list top 10 most relevant keywords found"],
            "suitable_roles": [
                "must include minimum 3 relevant roles",
                "based on skills and experience",
                "in order of best match"
            ],
            "enhancement_tips": [
                "provide atleast 5 specific career growth tips",
                "include timeline and actionable steps",
                "focus on role-specific improvements"
            ],
            "highlighted_companies": [
                "list notable companies from experience",
                "include industry leaders mentioned",
                "minimum 3 companies"
            ],
            "detailed_report": {{
                "sections": {{
                    "summary": <0-10>,
                    "skills": <0-10>,
                    "experience": <0-10>,
                    "education": <0-10>,
                    "certifications": <0-10>,
                    "projects": <0-10>
                }},
                "overall_recommendation": <0-100>,
                "section_improvements": {{
                    "section_name": ["specific improvements"]
                }},
                "priority_actions": ["list 5 prioritized actions"]
            }},
            "infographic_data": {{
                "metric_distribution": [
                    {{
                        "metric_name": "string",
                        "score": <0-100>,
                        "category": "string",
                        "importance": <1-5>
                    }}
                ],
                "role_comparison": [
                    {{
                        "compared_role": "string",
                        "similarity_index": <0-100>,
                        "key_matches": ["matching skills"],
                        "skill_gaps": ["missing skills"]
                    }}
                ],
                "skill_radar": {{
                    "skill_name": <0-100>
                }},
                "experience_timeline": {{
                    "year": ["achievements"]
                }},
                "keyword_cloud": {{
                    "keyword": <frequency>
                }},
                "industry_alignment": {{
                    "industry": <0-100>
                }}
            }},
            "market_insights": {{
                "demand_score": <0-100>,
                "salary_range": {{
                    "min": <value>,
                    "max": <value>,
                    "currency": "string"
                }},
                "growth_potential": <0-100>,
                "required_certifications": ["certification names"],
                "emerging_skills": ["skill names"]
            }}
        }}
    }}
}}
"#
    )
}

/// Prompt for the shareable-resume extraction flow. `{resume_text}` is the
/// plain text extracted from the uploaded PDF.
pub const SHARABLE_RESUME_PROMPT_TEMPLATE: &str = r#"Extract the candidate's profile from the resume text below into structured JSON.
Copy values verbatim from the resume; use an empty string or empty list when a field is absent. Do not invent details.

Return a JSON object with this EXACT schema (no extra fields):
{
  "name": "string",
  "email": "string",
  "contact_information": {
    "phone": "string",
    "linkedin": "string",
    "github": "string",
    "address": "string"
  },
  "summary": "string",
  "skills": ["string"],
  "experience": [
    {
      "company": "string",
      "role": "string",
      "duration": "string",
      "responsibilities": ["string"],
      "technologies_used": ["string"]
    }
  ],
  "education": [
    {
      "institution": "string",
      "degree": "string",
      "year": "string",
      "gpa": "string or omit"
    }
  ],
  "projects": [
    {
      "name": "string",
      "description": "string",
      "technologies": ["string"],
      "role": "string",
      "outcome": "string"
    }
  ],
  "additional_sections": {
    "awards": [
      {"title": "string", "description": "string"}
    ]
  }
}

Resume text:
{resume_text}
"#;

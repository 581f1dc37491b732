//! Role Profile Resolver — maps a free-text target role to a category, keyword profile
//! and readiness weights.
//!
//! `ROLE_RULES` is evaluated top to bottom against the lowercased role name; the first
//! rule with any matching substring wins, and `DEFAULT_PROFILE` covers everything else.
//! More specific categories therefore sit above broader ones (mobile before frontend,
//! because "react native" contains "react").

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleCategory {
    DataScience,
    Devops,
    Mobile,
    FullStack,
    Frontend,
    Backend,
    SoftwareEngineering,
    General,
}

impl RoleCategory {
    /// Stable id persisted with readiness snapshots.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleCategory::DataScience => "data_science",
            RoleCategory::Devops => "devops",
            RoleCategory::Mobile => "mobile",
            RoleCategory::FullStack => "full_stack",
            RoleCategory::Frontend => "frontend",
            RoleCategory::Backend => "backend",
            RoleCategory::SoftwareEngineering => "software_engineering",
            RoleCategory::General => "general",
        }
    }
}

/// Readiness weights. Every row of the rule table sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub coding: f64,
    pub portfolio: f64,
    pub resume: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleProfile {
    pub category: RoleCategory,
    /// Ordered; the résumé analyzer reports found/missing in this order.
    pub required_keywords: &'static [&'static str],
    pub recommended_keywords: &'static [&'static str],
    /// Practice topics suggested when no insight is available.
    pub practice_topics: &'static [&'static str],
    pub weights: Weights,
}

pub struct RoleRule {
    pub patterns: &'static [&'static str],
    pub profile: RoleProfile,
}

pub const ROLE_RULES: &[RoleRule] = &[
    RoleRule {
        patterns: &[
            "data scien",
            "machine learning",
            "ml engineer",
            "ai engineer",
            "deep learning",
            "data analyst",
        ],
        profile: RoleProfile {
            category: RoleCategory::DataScience,
            required_keywords: &[
                "python",
                "sql",
                "pandas",
                "numpy",
                "machine learning",
                "statistics",
                "scikit-learn",
                "tensorflow",
                "data visualization",
                "git",
            ],
            recommended_keywords: &[
                "pytorch",
                "spark",
                "tableau",
                "docker",
                "aws",
                "nlp",
                "deep learning",
            ],
            practice_topics: &[
                "Array",
                "Hash Table",
                "Math",
                "Sorting",
                "Binary Search",
                "Dynamic Programming",
            ],
            weights: Weights {
                coding: 0.30,
                portfolio: 0.40,
                resume: 0.30,
            },
        },
    },
    RoleRule {
        patterns: &[
            "devops",
            "site reliability",
            "sre",
            "cloud",
            "infrastructure",
            "platform engineer",
        ],
        profile: RoleProfile {
            category: RoleCategory::Devops,
            required_keywords: &[
                "linux",
                "docker",
                "kubernetes",
                "aws",
                "ci/cd",
                "terraform",
                "python",
                "bash",
                "git",
                "monitoring",
            ],
            recommended_keywords: &[
                "ansible",
                "prometheus",
                "grafana",
                "jenkins",
                "azure",
                "gcp",
                "helm",
            ],
            practice_topics: &["String", "Hash Table", "Graph", "Simulation", "Greedy"],
            weights: Weights {
                coding: 0.20,
                portfolio: 0.45,
                resume: 0.35,
            },
        },
    },
    RoleRule {
        patterns: &[
            "android",
            "ios",
            "mobile",
            "flutter",
            "react native",
            "kotlin",
            "swift",
        ],
        profile: RoleProfile {
            category: RoleCategory::Mobile,
            required_keywords: &[
                "kotlin",
                "swift",
                "java",
                "android",
                "ios",
                "flutter",
                "rest api",
                "git",
            ],
            recommended_keywords: &[
                "react native",
                "firebase",
                "dart",
                "jetpack compose",
                "swiftui",
                "ci/cd",
            ],
            practice_topics: &[
                "Array",
                "String",
                "Hash Table",
                "Tree",
                "Dynamic Programming",
            ],
            weights: Weights {
                coding: 0.25,
                portfolio: 0.45,
                resume: 0.30,
            },
        },
    },
    RoleRule {
        patterns: &[
            "full stack",
            "full-stack",
            "fullstack",
            "mern",
            "mean stack",
            "web developer",
        ],
        profile: RoleProfile {
            category: RoleCategory::FullStack,
            required_keywords: &[
                "javascript",
                "typescript",
                "react",
                "node.js",
                "html",
                "css",
                "sql",
                "rest api",
                "git",
            ],
            recommended_keywords: &["mongodb", "docker", "next.js", "graphql", "aws", "redis"],
            practice_topics: &[
                "Array",
                "String",
                "Hash Table",
                "Tree",
                "Graph",
                "Dynamic Programming",
            ],
            weights: Weights {
                coding: 0.30,
                portfolio: 0.40,
                resume: 0.30,
            },
        },
    },
    RoleRule {
        patterns: &[
            "frontend",
            "front-end",
            "front end",
            "ui engineer",
            "ui developer",
            "react",
            "angular",
            "vue",
        ],
        profile: RoleProfile {
            category: RoleCategory::Frontend,
            required_keywords: &[
                "javascript",
                "typescript",
                "react",
                "html",
                "css",
                "responsive design",
                "git",
                "rest api",
            ],
            recommended_keywords: &[
                "next.js",
                "redux",
                "tailwind",
                "webpack",
                "jest",
                "accessibility",
            ],
            practice_topics: &["Array", "String", "Hash Table", "Stack", "Tree"],
            weights: Weights {
                coding: 0.25,
                portfolio: 0.45,
                resume: 0.30,
            },
        },
    },
    RoleRule {
        patterns: &[
            "backend",
            "back-end",
            "back end",
            "api developer",
            "server",
            "java developer",
            "golang",
        ],
        profile: RoleProfile {
            category: RoleCategory::Backend,
            required_keywords: &[
                "java",
                "python",
                "sql",
                "rest api",
                "docker",
                "microservices",
                "git",
                "database",
                "linux",
            ],
            recommended_keywords: &[
                "kubernetes",
                "redis",
                "kafka",
                "aws",
                "golang",
                "spring boot",
                "postgresql",
            ],
            practice_topics: &[
                "Hash Table",
                "Tree",
                "Graph",
                "Dynamic Programming",
                "Design",
                "Database",
            ],
            weights: Weights {
                coding: 0.35,
                portfolio: 0.35,
                resume: 0.30,
            },
        },
    },
    RoleRule {
        patterns: &[
            "algorithm",
            "competitive",
            "sde",
            "software engineer",
            "software developer",
            "programmer",
        ],
        profile: RoleProfile {
            category: RoleCategory::SoftwareEngineering,
            required_keywords: &[
                "data structures",
                "algorithms",
                "java",
                "c++",
                "python",
                "object-oriented",
                "git",
                "system design",
                "sql",
            ],
            recommended_keywords: &["docker", "aws", "linux", "unit testing", "ci/cd", "rest api"],
            practice_topics: &[
                "Dynamic Programming",
                "Graph",
                "Tree",
                "Binary Search",
                "Greedy",
                "Backtracking",
                "Heap (Priority Queue)",
            ],
            weights: Weights {
                coding: 0.50,
                portfolio: 0.25,
                resume: 0.25,
            },
        },
    },
];

pub const DEFAULT_PROFILE: RoleProfile = RoleProfile {
    category: RoleCategory::General,
    required_keywords: &[
        "git",
        "sql",
        "python",
        "javascript",
        "data structures",
        "algorithms",
        "problem solving",
        "communication",
    ],
    recommended_keywords: &["docker", "aws", "rest api", "linux", "testing"],
    practice_topics: &[
        "Array",
        "String",
        "Hash Table",
        "Linked List",
        "Tree",
        "Dynamic Programming",
    ],
    weights: Weights {
        coding: 0.33,
        portfolio: 0.34,
        resume: 0.33,
    },
};

/// Resolves a free-text role name. Total: unknown or empty names get `DEFAULT_PROFILE`.
pub fn resolve_role(role_name: &str) -> &'static RoleProfile {
    let name = role_name.to_lowercase();
    ROLE_RULES
        .iter()
        .find(|rule| rule.patterns.iter().any(|p| name.contains(p)))
        .map(|rule| &rule.profile)
        .unwrap_or(&DEFAULT_PROFILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_weight_row_sums_to_one() {
        let rows = ROLE_RULES
            .iter()
            .map(|r| &r.profile)
            .chain(std::iter::once(&DEFAULT_PROFILE));
        for profile in rows {
            let w = profile.weights;
            let sum = w.coding + w.portfolio + w.resume;
            assert!(
                (sum - 1.0).abs() < 1e-9,
                "{} weights sum to {sum}",
                profile.category.as_str()
            );
        }
    }

    #[test]
    fn test_required_keyword_sets_fit_missing_cap() {
        for rule in ROLE_RULES {
            assert!(rule.profile.required_keywords.len() <= 10);
        }
        assert!(DEFAULT_PROFILE.required_keywords.len() <= 10);
    }

    #[test]
    fn test_empty_and_unknown_roles_use_default() {
        assert_eq!(resolve_role("").category, RoleCategory::General);
        assert_eq!(resolve_role("Product Manager").category, RoleCategory::General);
        assert_eq!(resolve_role("").weights.portfolio, 0.34);
    }

    #[test]
    fn test_software_engineering_rule() {
        for name in [
            "SDE Intern",
            "Software Engineer",
            "Competitive Programmer",
            "ALGORITHM researcher",
        ] {
            assert_eq!(
                resolve_role(name).category,
                RoleCategory::SoftwareEngineering,
                "{name}"
            );
        }
    }

    #[test]
    fn test_specific_rules() {
        assert_eq!(resolve_role("Frontend Developer").category, RoleCategory::Frontend);
        assert_eq!(resolve_role("Backend Developer").category, RoleCategory::Backend);
        assert_eq!(resolve_role("Full Stack Developer").category, RoleCategory::FullStack);
        assert_eq!(resolve_role("Data Scientist").category, RoleCategory::DataScience);
        assert_eq!(resolve_role("Cloud Engineer").category, RoleCategory::Devops);
        assert_eq!(resolve_role("Android Developer").category, RoleCategory::Mobile);
    }

    #[test]
    fn test_first_match_wins() {
        // "react native" also contains "react" (frontend); mobile sits higher.
        assert_eq!(resolve_role("React Native Developer").category, RoleCategory::Mobile);
        // "machine learning software engineer" matches both data science and SDE rules.
        assert_eq!(
            resolve_role("Machine Learning Software Engineer").category,
            RoleCategory::DataScience
        );
    }
}

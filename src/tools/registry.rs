//! Tool registry - static tool declarations per agent role
//!
//! Central place for the schemas offered to each agent. The registry
//! holds no behaviour; dispatch lives in the executor and the
//! conversational agent.

use std::collections::HashMap;

use crate::core::config::WebSearchConfig;
use crate::core::ToolDefinition;

pub use crate::core::AgentRole as ToolRole;

/// Tool names shared between the registry, executor and agents
pub mod names {
    pub const CREATE_FOLDER: &str = "create_folder";
    pub const CREATE_FILE: &str = "create_file";
    pub const READ_FILE: &str = "read_file";
    pub const UPDATE_FILE: &str = "update_file";
    pub const LIST_FILES: &str = "list_files";
    pub const RETURN_RESULT: &str = "return_result";

    pub const WEB_SEARCH: &str = "web_search";
    pub const GENERATE_PRESENTATION: &str = "generate_presentation";
}

/// Provider type string for the hosted web search tool
const WEB_SEARCH_TYPE: &str = "web_search_20250305";

/// Registry of available tools
pub struct ToolRegistry {
    /// Tool definitions indexed by name
    definitions: HashMap<String, ToolDefinition>,
    /// Role each tool belongs to
    roles: HashMap<String, ToolRole>,
    /// Registration order, so requests are stable
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create a registry with both roles' tools
    pub fn new(web_search: &WebSearchConfig) -> Self {
        let mut registry = Self {
            definitions: HashMap::new(),
            roles: HashMap::new(),
            order: Vec::new(),
        };

        registry.register_generation_tools();
        registry.register_conversation_tools(web_search);

        registry
    }

    /// Register the file tools used to build a deck
    fn register_generation_tools(&mut self) {
        self.register(
            ToolDefinition::function(
                names::CREATE_FOLDER,
                "Create a folder in the working directory. Use this to organise slide files or assets.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "folder_path": {
                            "type": "string",
                            "description": "Folder to create, relative to the working directory (e.g. 'slides/assets')"
                        }
                    },
                    "required": ["folder_path"]
                }),
            ),
            ToolRole::Generation,
        );

        self.register(
            ToolDefinition::function(
                names::CREATE_FILE,
                "Create an HTML slide file with a complete, valid HTML document, or a CSS file with complete CSS. \
                 Slides may pull Tailwind, Google Fonts or icon packs from a CDN. \
                 The content must be the COMPLETE file, not a snippet.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "file_path": {
                            "type": "string",
                            "description": "Where to create the file (e.g. 'slides/slide_1.html')"
                        },
                        "content": {
                            "type": "string",
                            "description": "Complete file content, including DOCTYPE, head and body for HTML"
                        }
                    },
                    "required": ["file_path", "content"]
                }),
            ),
            ToolRole::Generation,
        );

        self.register(
            ToolDefinition::function(
                names::READ_FILE,
                "Read an existing file. Use this to review slides you already created.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "file_path": {
                            "type": "string",
                            "description": "File to read"
                        }
                    },
                    "required": ["file_path"]
                }),
            ),
            ToolRole::Generation,
        );

        self.register(
            ToolDefinition::function(
                names::UPDATE_FILE,
                "Replace the content of an existing file. The content must be the COMPLETE updated file.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "file_path": {
                            "type": "string",
                            "description": "File to update"
                        },
                        "content": {
                            "type": "string",
                            "description": "Complete updated file content"
                        }
                    },
                    "required": ["file_path", "content"]
                }),
            ),
            ToolRole::Generation,
        );

        self.register(
            ToolDefinition::function(
                names::LIST_FILES,
                "List the files in a directory. Use this to see which slides exist.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "directory": {
                            "type": "string",
                            "description": "Directory to list (default: 'slides')"
                        }
                    },
                    "required": []
                }),
            ),
            ToolRole::Generation,
        );

        self.register(
            ToolDefinition::function(
                names::RETURN_RESULT,
                "Finish the run and report the deck. Call this ONLY once every slide has been created.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "success": {
                            "type": "boolean",
                            "description": "Whether the deck was generated successfully"
                        },
                        "title": {
                            "type": "string",
                            "description": "Presentation title"
                        },
                        "message": {
                            "type": "string",
                            "description": "Short summary of the generated deck"
                        },
                        "slide_count": {
                            "type": "integer",
                            "description": "Number of slides created"
                        },
                        "slide_files": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "Slide files in presentation order"
                        }
                    },
                    "required": ["success", "message", "slide_files"]
                }),
            ),
            ToolRole::Generation,
        );
    }

    /// Register the tools offered to the conversational agent
    fn register_conversation_tools(&mut self, web_search: &WebSearchConfig) {
        if web_search.enabled {
            self.register(
                ToolDefinition::server(
                    WEB_SEARCH_TYPE,
                    names::WEB_SEARCH,
                    Some(web_search.max_uses),
                ),
                ToolRole::Conversation,
            );
        }

        self.register(
            ToolDefinition::function(
                names::GENERATE_PRESENTATION,
                "Hand the collected requirements to the deck generator, which builds the presentation \
                 as HTML slides and exports it. Use this ONLY once you have gathered the topic, purpose, \
                 content outline, supporting data, and brand logo, guideline and colour details. \
                 Pass along as much relevant detail as you can.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "topic": {
                            "type": "string",
                            "description": "Main topic or title (e.g. 'Q4 Product Roadmap 2025')"
                        },
                        "description": {
                            "type": "string",
                            "description": "What the presentation is about and its purpose"
                        },
                        "details": {
                            "type": "string",
                            "description": "Content outline, key points and overall structure"
                        },
                        "data": {
                            "type": "string",
                            "description": "Specific data, statistics or asset links to include"
                        },
                        "brand_logo_details": {
                            "type": "string",
                            "description": "Brand logo: file path, URL or description"
                        },
                        "brand_guideline_details": {
                            "type": "string",
                            "description": "Tone, voice, fonts and style preferences"
                        },
                        "brand_color_details": {
                            "type": "string",
                            "description": "Brand colours in hex (e.g. 'primary: #1E40AF, secondary: #F59E0B')"
                        },
                        "slide_count": {
                            "type": "integer",
                            "description": "Desired number of content slides, if the user asked for one"
                        }
                    },
                    "required": [
                        "topic",
                        "description",
                        "details",
                        "data",
                        "brand_logo_details",
                        "brand_guideline_details",
                        "brand_color_details"
                    ]
                }),
            ),
            ToolRole::Conversation,
        );
    }

    /// Register a tool definition
    pub fn register(&mut self, definition: ToolDefinition, role: ToolRole) {
        let name = definition.name().to_string();
        if !self.definitions.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.definitions.insert(name.clone(), definition);
        self.roles.insert(name, role);
    }

    /// Tool definitions for one role, in registration order
    pub fn definitions_for(&self, role: ToolRole) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter(|name| self.roles.get(*name) == Some(&role))
            .filter_map(|name| self.definitions.get(name).cloned())
            .collect()
    }

    /// Tools offered to the generation agent
    pub fn generation_tools(&self) -> Vec<ToolDefinition> {
        self.definitions_for(ToolRole::Generation)
    }

    /// Tools offered to the conversational agent
    pub fn conversation_tools(&self) -> Vec<ToolDefinition> {
        self.definitions_for(ToolRole::Conversation)
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.definitions.get(name)
    }

    /// Role a tool is registered under
    pub fn role_of(&self, name: &str) -> Option<ToolRole> {
        self.roles.get(name).copied()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no tools are registered
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(&WebSearchConfig::default())
    }
}

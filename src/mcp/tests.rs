//! MCP protocol and tool definition tests.

#[cfg(test)]
mod protocol_tests {
    use crate::mcp::protocol::*;

    #[test]
    fn request_round_trips_through_json() {
        let json = r#"{"jsonrpc":"2.0","method":"tools/list","params":null,"id":7}"#;
        let message: JsonRpcMessage = serde_json::from_str(json).expect("parses");

        match message {
            JsonRpcMessage::Request(request) => {
                assert_eq!(request.jsonrpc, JSONRPC_VERSION);
                assert_eq!(request.method, "tools/list");
                assert_eq!(request.id, RequestId::Number(7));
            }
            other => panic!("Expected request, got {other:?}"),
        }
    }

    #[test]
    fn string_ids_are_accepted() {
        let json = r#"{"jsonrpc":"2.0","method":"ping","params":null,"id":"abc-1"}"#;
        let request: JsonRpcRequest = serde_json::from_str(json).expect("parses");
        assert_eq!(request.id, RequestId::String("abc-1".to_string()));
    }

    #[test]
    fn message_without_id_is_a_notification() {
        let json = r#"{"jsonrpc":"2.0","method":"initialized"}"#;
        let message: JsonRpcMessage = serde_json::from_str(json).expect("parses");
        assert!(matches!(message, JsonRpcMessage::Notification(_)));
    }

    #[test]
    fn error_constructors_use_standard_codes() {
        assert_eq!(JsonRpcError::parse_error().code, -32700);
        assert_eq!(JsonRpcError::invalid_request().code, -32600);
        assert_eq!(JsonRpcError::method_not_found().code, -32601);
        assert_eq!(JsonRpcError::internal_error(None).code, -32603);
    }

    #[test]
    fn tool_content_serializes_with_type_tag() {
        let content = ToolContent::Text {
            text: "hello".to_string(),
        };
        let json = serde_json::to_value(&content).expect("serializes");
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"], "hello");
    }

    #[test]
    fn call_tool_result_uses_camel_case_error_flag() {
        let result = CallToolResult {
            content: Vec::new(),
            is_error: Some(true),
        };
        let json = serde_json::to_value(&result).expect("serializes");
        assert_eq!(json["isError"], true);
    }
}

#[cfg(test)]
mod tool_definition_tests {
    use crate::mcp::tools::*;

    #[test]
    fn embed_document_tool_definition() {
        let tool = EmbedDocumentHandler::tool_definition();

        assert_eq!(tool.name, "embed_document");
        let schema = tool.input_schema;
        let properties = schema["properties"].as_object().expect("has properties");
        assert!(properties.contains_key("file_path"));
        assert!(properties.contains_key("metadata"));

        let required = schema["required"].as_array().expect("has required array");
        assert_eq!(required.len(), 1);
        assert_eq!(required[0], "file_path");
    }

    #[test]
    fn search_documents_tool_definition() {
        let tool = SearchDocumentsHandler::tool_definition();

        assert_eq!(tool.name, "search_documents");
        let schema = tool.input_schema;
        let properties = schema["properties"].as_object().expect("has properties");
        assert!(properties.contains_key("query"));
        assert!(properties.contains_key("top_k"));
        assert!(properties.contains_key("min_similarity"));

        assert_eq!(schema["properties"]["top_k"]["type"], "integer");
        assert_eq!(schema["properties"]["min_similarity"]["type"], "number");

        let required = schema["required"].as_array().expect("has required array");
        assert_eq!(required.len(), 1);
        assert_eq!(required[0], "query");
    }

    #[test]
    fn ask_question_tool_definition() {
        let tool = AskQuestionHandler::tool_definition();

        assert_eq!(tool.name, "ask_question");
        let schema = tool.input_schema;
        let properties = schema["properties"].as_object().expect("has properties");
        assert!(properties.contains_key("question"));
        assert!(properties.contains_key("context_limit"));
        assert!(properties.contains_key("similarity_threshold"));

        let required = schema["required"].as_array().expect("has required array");
        assert_eq!(required[0], "question");
    }

    #[test]
    fn parameterless_tools_have_empty_schemas() {
        for tool in [
            GetDatabaseStatsHandler::tool_definition(),
            ListDocumentsHandler::tool_definition(),
        ] {
            let properties = tool.input_schema["properties"]
                .as_object()
                .expect("has properties")
                .clone();
            assert!(properties.is_empty(), "{} has parameters", tool.name);
        }
    }

    #[test]
    fn delete_and_get_tools_name_their_key() {
        let delete = DeleteDocumentHandler::tool_definition();
        assert_eq!(delete.name, "delete_document");
        assert_eq!(delete.input_schema["required"][0], "filename");

        let get = GetDocumentHandler::tool_definition();
        assert_eq!(get.name, "get_document");
        assert_eq!(get.input_schema["required"][0], "document_id");
        assert_eq!(
            get.input_schema["properties"]["document_id"]["type"],
            "integer"
        );
    }
}

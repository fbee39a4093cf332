//! Tests for core types

#[cfg(test)]
mod type_tests {
    use crate::{
        CompletionRequest, ContextProvider, Domain, DomainSelector, Error, Message, NoContext, Role,
    };
    use insta::assert_snapshot;

    #[test]
    fn test_domain_from_str_case_insensitive() {
        assert_eq!("Migration".parse::<Domain>().unwrap(), Domain::Migration);
        assert_eq!(" ARCHITECTURE ".parse::<Domain>().unwrap(), Domain::Architecture);
        assert_eq!("costing".parse::<Domain>().unwrap(), Domain::Costing);
        assert!(matches!("optimization".parse::<Domain>(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_domain_display_round_trip() {
        for domain in Domain::ALL {
            assert_eq!(domain.to_string().parse::<Domain>().unwrap(), domain);
        }
    }

    #[test]
    fn test_domain_priority_order() {
        assert_eq!(
            Domain::ALL,
            [Domain::Migration, Domain::Architecture, Domain::Costing]
        );
        assert!(Domain::Migration < Domain::Architecture);
        assert!(Domain::Architecture < Domain::Costing);
    }

    #[test]
    fn test_selector_domains() {
        assert_eq!(
            DomainSelector::Single(Domain::Costing).domains(),
            vec![Domain::Costing]
        );
        assert_eq!(DomainSelector::All.domains(), Domain::ALL.to_vec());
        assert_eq!(DomainSelector::All.to_string(), "all");
    }

    #[test]
    fn test_message_wire_format() {
        let messages = vec![
            Message::system("You are an advisor."),
            Message::user("Hi"),
            Message::assistant("Hello!"),
        ];
        assert_eq!(messages[1].role, Role::User);
        assert_snapshot!(serde_json::to_string(&messages).unwrap(), @r#"[{"role":"system","content":"You are an advisor."},{"role":"user","content":"Hi"},{"role":"assistant","content":"Hello!"}]"#);
    }

    #[test]
    fn test_completion_request_defaults() {
        let request = CompletionRequest::new(vec![Message::user("Hi")]);
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.max_tokens, 2048);
        assert!(request.stream);

        let request = request.with_temperature(0.2).with_max_tokens(512);
        assert_eq!(request.temperature, 0.2);
        assert_eq!(request.max_tokens, 512);
    }

    #[tokio::test]
    async fn test_no_context_is_empty() {
        assert!(NoContext.relevant_context("anything").await.is_empty());
    }
}

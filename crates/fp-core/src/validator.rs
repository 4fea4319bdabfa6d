// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Registration-time checks for procedures that are about to be published

use crate::error::{IntrospectionError, RegistrationError};
use crate::publication::{
    operation_name, OperationArgument, PublicationRecord, ReturnKind, RoleRequirement,
};
use crate::registry::PublicationRegistry;
use crate::traits::{RoleResolver, TypeIntrospector};
use crate::types::{ObjectType, PrimitiveKind, TypeDescriptor};
use std::sync::Arc;
use tracing::{debug, info};

/// Validates procedure signatures and access roles before publication
pub struct PublicationValidator<'a> {
    introspector: &'a dyn TypeIntrospector,
    roles: &'a dyn RoleResolver,
}

impl<'a> PublicationValidator<'a> {
    pub fn new(introspector: &'a dyn TypeIntrospector, roles: &'a dyn RoleResolver) -> Self {
        Self {
            introspector,
            roles,
        }
    }

    /// Check `procedure` and build its record. The first violated rule wins.
    pub fn validate(
        &self,
        procedure: &str,
        role: &str,
        description: &str,
    ) -> Result<PublicationRecord, RegistrationError> {
        let required_role = RoleRequirement::parse(role);
        if let RoleRequirement::Role(name) = &required_role {
            if !self.roles.role_exists(name) {
                return Err(RegistrationError::UnknownRole {
                    procedure: procedure.to_string(),
                    role: name.clone(),
                });
            }
        }

        let mut signature = self
            .introspector
            .argument_signature(procedure)
            .map_err(|err| unknown_procedure(procedure, err))?;
        if signature.len() > 1 {
            return Err(RegistrationError::TooManyArguments {
                procedure: procedure.to_string(),
                count: signature.len(),
            });
        }

        let argument = match signature.pop() {
            None => None,
            Some((name, TypeDescriptor::Object(object_type))) => {
                if !object_type.is_publishable() {
                    return Err(RegistrationError::ArgumentMustBeTransient {
                        procedure: procedure.to_string(),
                        entity: object_type.entity,
                    });
                }
                Some(OperationArgument { name, object_type })
            }
            Some((name, other)) => {
                return Err(RegistrationError::InvalidArgumentShape {
                    procedure: procedure.to_string(),
                    argument: name,
                    found: other.to_string(),
                });
            }
        };

        let return_type = self
            .introspector
            .return_type(procedure)
            .map_err(|err| unknown_procedure(procedure, err))?;
        let (return_kind, return_object) = classify_return(procedure, return_type)?;

        let name = operation_name(procedure).ok_or_else(|| RegistrationError::InvalidName {
            procedure: procedure.to_string(),
        })?;

        debug!(
            procedure,
            operation = name,
            ?return_kind,
            has_argument = argument.is_some(),
            "validated publication"
        );

        Ok(PublicationRecord::new(
            name.to_string(),
            procedure.to_string(),
            required_role,
            argument,
            return_kind,
            return_object,
            description.to_string(),
        ))
    }

    /// Validate and insert into `registry`, making the operation callable
    pub fn publish(
        &self,
        registry: &mut PublicationRegistry,
        procedure: &str,
        role: &str,
        description: &str,
    ) -> Result<Arc<PublicationRecord>, RegistrationError> {
        let record = registry.register(self.validate(procedure, role, description)?)?;
        info!(
            procedure,
            operation = record.name(),
            role = record.required_role().as_str(),
            "published operation"
        );
        Ok(record)
    }
}

fn classify_return(
    procedure: &str,
    return_type: TypeDescriptor,
) -> Result<(ReturnKind, Option<ObjectType>), RegistrationError> {
    let (kind, object_type) = match return_type {
        TypeDescriptor::Void => return Ok((ReturnKind::None, None)),
        TypeDescriptor::Primitive(PrimitiveKind::String) => return Ok((ReturnKind::String, None)),
        TypeDescriptor::Object(object_type) => (ReturnKind::Object, object_type),
        TypeDescriptor::List(object_type) => (ReturnKind::List, object_type),
        other => {
            return Err(RegistrationError::UnsupportedReturnType {
                procedure: procedure.to_string(),
                found: other.to_string(),
            });
        }
    };

    if !object_type.is_publishable() {
        return Err(RegistrationError::ReturnMustBeTransient {
            procedure: procedure.to_string(),
            entity: object_type.entity,
        });
    }
    Ok((kind, Some(object_type)))
}

fn unknown_procedure(procedure: &str, err: IntrospectionError) -> RegistrationError {
    match err {
        IntrospectionError::UnknownProcedure(_) => RegistrationError::UnknownProcedure {
            procedure: procedure.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockRoleResolver;
    use crate::types::EntityDescriptor;

    /// Introspector answering for a single procedure
    struct Signature {
        arguments: Vec<(String, TypeDescriptor)>,
        returns: TypeDescriptor,
    }

    impl TypeIntrospector for Signature {
        fn argument_signature(
            &self,
            procedure: &str,
        ) -> Result<Vec<(String, TypeDescriptor)>, IntrospectionError> {
            if procedure.starts_with("Missing.") {
                return Err(IntrospectionError::UnknownProcedure(procedure.to_string()));
            }
            Ok(self.arguments.clone())
        }

        fn return_type(&self, _procedure: &str) -> Result<TypeDescriptor, IntrospectionError> {
            Ok(self.returns.clone())
        }

        fn entity(&self, _entity: &str) -> Option<EntityDescriptor> {
            None
        }
    }

    fn string() -> TypeDescriptor {
        TypeDescriptor::Primitive(PrimitiveKind::String)
    }

    fn persisted(entity: &str, file_document: bool) -> ObjectType {
        ObjectType {
            entity: entity.to_string(),
            persistable: true,
            file_document,
        }
    }

    fn any_role() -> MockRoleResolver {
        let mut roles = MockRoleResolver::new();
        roles.expect_role_exists().returning(|_| true);
        roles
    }

    fn validate(signature: Signature, procedure: &str) -> Result<PublicationRecord, RegistrationError> {
        let roles = any_role();
        PublicationValidator::new(&signature, &roles).validate(procedure, "*", "doc")
    }

    #[test]
    fn unknown_role_fails_before_signature_checks() {
        let signature = Signature {
            arguments: vec![
                ("a".into(), TypeDescriptor::object("M.A")),
                ("b".into(), TypeDescriptor::object("M.B")),
            ],
            returns: string(),
        };
        let mut roles = MockRoleResolver::new();
        roles
            .expect_role_exists()
            .withf(|role| role == "Auditor")
            .times(1)
            .returning(|_| false);

        let err = PublicationValidator::new(&signature, &roles)
            .validate("M.Audit", "Auditor", "")
            .unwrap_err();
        assert!(matches!(err, RegistrationError::UnknownRole { ref role, .. } if role == "Auditor"));
    }

    #[test]
    fn wildcard_role_skips_role_lookup() {
        let signature = Signature {
            arguments: vec![],
            returns: string(),
        };
        let mut roles = MockRoleResolver::new();
        roles.expect_role_exists().never();

        let record = PublicationValidator::new(&signature, &roles)
            .validate("M.Hello", "*", "")
            .expect("valid");
        assert_eq!(record.required_role(), &RoleRequirement::Anyone);
    }

    #[test]
    fn more_than_one_argument_is_rejected() {
        let err = validate(
            Signature {
                arguments: vec![
                    ("a".into(), TypeDescriptor::object("M.A")),
                    ("b".into(), TypeDescriptor::object("M.B")),
                ],
                returns: string(),
            },
            "M.Two",
        )
        .unwrap_err();
        assert!(matches!(err, RegistrationError::TooManyArguments { count: 2, .. }));
    }

    #[test]
    fn primitive_argument_is_rejected() {
        let err = validate(
            Signature {
                arguments: vec![("text".into(), string())],
                returns: string(),
            },
            "M.Echo",
        )
        .unwrap_err();
        assert!(
            matches!(err, RegistrationError::InvalidArgumentShape { ref argument, .. } if argument == "text")
        );
    }

    #[test]
    fn persisted_argument_is_rejected_unless_file_document() {
        let err = validate(
            Signature {
                arguments: vec![("order".into(), TypeDescriptor::Object(persisted("M.Order", false)))],
                returns: string(),
            },
            "M.Submit",
        )
        .unwrap_err();
        assert!(matches!(err, RegistrationError::ArgumentMustBeTransient { ref entity, .. } if entity == "M.Order"));

        let record = validate(
            Signature {
                arguments: vec![("upload".into(), TypeDescriptor::Object(persisted("M.Upload", true)))],
                returns: string(),
            },
            "M.Store",
        )
        .expect("file documents are allowed");
        assert_eq!(record.argument().map(|a| a.name.as_str()), Some("upload"));
    }

    #[test]
    fn return_types_are_classified() {
        let cases = [
            (TypeDescriptor::Void, ReturnKind::None),
            (string(), ReturnKind::String),
            (TypeDescriptor::object("M.Result"), ReturnKind::Object),
            (TypeDescriptor::list_of("M.Result"), ReturnKind::List),
        ];
        for (returns, expected) in cases {
            let record = validate(
                Signature {
                    arguments: vec![],
                    returns,
                },
                "M.Op",
            )
            .expect("valid");
            assert_eq!(record.return_kind(), expected);
        }
    }

    #[test]
    fn persisted_list_element_is_rejected() {
        let err = validate(
            Signature {
                arguments: vec![],
                returns: TypeDescriptor::List(persisted("M.Customer", false)),
            },
            "M.Customers",
        )
        .unwrap_err();
        assert!(matches!(err, RegistrationError::ReturnMustBeTransient { .. }));
    }

    #[test]
    fn non_string_primitive_return_is_unsupported() {
        let err = validate(
            Signature {
                arguments: vec![],
                returns: TypeDescriptor::Primitive(PrimitiveKind::Integer),
            },
            "M.Count",
        )
        .unwrap_err();
        assert!(matches!(err, RegistrationError::UnsupportedReturnType { .. }));
    }

    #[test]
    fn unknown_procedure_and_invalid_name() {
        let err = validate(
            Signature {
                arguments: vec![],
                returns: string(),
            },
            "Missing.Op",
        )
        .unwrap_err();
        assert!(matches!(err, RegistrationError::UnknownProcedure { .. }));

        let err = validate(
            Signature {
                arguments: vec![],
                returns: string(),
            },
            "Module.",
        )
        .unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidName { .. }));
    }

    #[test]
    fn publish_rejects_duplicates() {
        let signature = Signature {
            arguments: vec![],
            returns: string(),
        };
        let roles = any_role();
        let validator = PublicationValidator::new(&signature, &roles);
        let mut registry = PublicationRegistry::new();

        validator.publish(&mut registry, "A.Hello", "*", "first").expect("first");
        let err = validator.publish(&mut registry, "B.Hello", "*", "second").unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateName { .. }));
        assert_eq!(registry.lookup("Hello").unwrap().procedure(), "A.Hello");
    }
}

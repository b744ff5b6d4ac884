use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use turbo_client::Procedure;
use turbo_commerce::identity::{Identity, IdentityQuerySelf};
use turbo_commerce::{schemas, IdentityId};
use turbo_core::{ProcedureResult, RequestContext, SchemaResult};

use super::FakeSession;

/// Backend view of the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccountRecord {
    Visitor,
    Guest { token: String },
    Member { account: String, email: String },
}

/// `identity.getSelf`
///
/// Signed-in callers come from the session's identity context. Everyone else
/// except bots gets a guest token, which is remembered in the session.
pub struct IdentityGetSelf {
    pub(crate) namespace: String,
}

#[async_trait]
impl Procedure for IdentityGetSelf {
    type Input = IdentityQuerySelf;
    type Output = Identity;
    type Data = AccountRecord;

    fn input_schema(&self) -> SchemaResult<IdentityQuerySelf> {
        Ok(schemas::identity_query_self())
    }

    fn output_schema(&self) -> SchemaResult<Identity> {
        schemas::identity()
    }

    async fn fetch(&self, _input: &IdentityQuerySelf, ctx: &RequestContext) -> ProcedureResult<AccountRecord> {
        if let Some(account) = &ctx.session.identity_context.identifier {
            return Ok(AccountRecord::Member {
                account: account.clone(),
                email: format!("{}@example.com", account),
            });
        }
        if ctx.is_bot {
            return Ok(AccountRecord::Visitor);
        }

        let token = FakeSession::load(ctx, &self.namespace)?
            .guest
            .unwrap_or_else(IdentityId::generate);
        Ok(AccountRecord::Guest {
            token: token.into_inner(),
        })
    }

    async fn transform(
        &self,
        _input: &IdentityQuerySelf,
        ctx: &mut RequestContext,
        data: AccountRecord,
    ) -> ProcedureResult<Identity> {
        Ok(match data {
            AccountRecord::Visitor => Identity::Anonymous,
            AccountRecord::Guest { token } => {
                let id = IdentityId::new(token);
                let mut session = FakeSession::load(ctx, &self.namespace)?;
                session.guest = Some(id.clone());
                session.save(ctx, &self.namespace)?;
                Identity::Guest { id }
            }
            AccountRecord::Member { account, email } => Identity::Registered {
                id: IdentityId::new(account),
                email,
            },
        })
    }
}

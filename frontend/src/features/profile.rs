//! 个人资料
//!
//! 读取文档库中的档案，编辑显示名称与头像地址。保存时先写档案，
//! 再尽力同步身份服务中的显示名称，失败只记录警告。

use async_trait::async_trait;
use leptos::prelude::*;
use leptos::task::spawn_local;
use sigpa::{AppError, AppResult, FeatureModule, ModuleHandle, MountContext, NoopHandle};
use sigpa_shared::validation::validate_display_name;
use sigpa_shared::{AuthUser, ProfilePatch, UserProfile, provider_display_name};
use web_sys::HtmlElement;

use super::widgets::PageHeader;
use super::{mount_view, show_loading};
use crate::auth::refresh_user;
use crate::services::{AppServices, Services};

pub struct ProfileModule {
    services: AppServices,
}

impl ProfileModule {
    pub fn new(services: AppServices) -> Self {
        Self { services }
    }
}

#[async_trait(?Send)]
impl FeatureModule<HtmlElement> for ProfileModule {
    async fn mount(&self, ctx: MountContext<HtmlElement>) -> AppResult<Box<dyn ModuleHandle>> {
        let user = self
            .services
            .auth
            .current_user()
            .ok_or_else(|| AppError::unauthorized("Usuario no autenticado").in_op("profile.mount"))?;

        show_loading(&ctx.container);
        let profile = match self.services.profiles.get_profile(&user.uid).await {
            Ok(profile) => profile,
            Err(e) => {
                web_sys::console::error_1(&format!("[Perfil] Error al obtener perfil: {}", e).into());
                None
            }
        };
        if !ctx.token.is_current() {
            return Ok(Box::new(NoopHandle));
        }

        let services = self.services.clone();
        Ok(mount_view(&ctx.container, move || {
            view! {
                <ProfileView user=user profile=profile services=StoredValue::new_local(services) />
            }
            .into_any()
        }))
    }
}

/// 档案中的值优先，其次是会话中的值
fn initial_values(user: &AuthUser, profile: Option<&UserProfile>) -> (String, String) {
    let pick = |stored: Option<&str>, session: Option<&str>| {
        stored
            .filter(|v| !v.is_empty())
            .or(session)
            .unwrap_or_default()
            .to_string()
    };
    (
        pick(profile.map(|p| p.display_name.as_str()), user.display_name.as_deref()),
        pick(profile.map(|p| p.photo_url.as_str()), user.photo_url.as_deref()),
    )
}

async fn save(services: AppServices, uid: String, name: String, photo: String) -> AppResult<()> {
    let patch = ProfilePatch {
        display_name: Some(name.clone()),
        photo_url: Some(photo.clone()),
    };
    let session_user = services.auth.current_user();
    services
        .profiles
        .update_profile(&uid, &patch, session_user.as_ref())
        .await?;

    if let Some(session) = services.auth.current_session() {
        if let Err(e) = services.identity.update_display_name(session, &name).await {
            web_sys::console::warn_1(&format!("[Perfil] No se pudo actualizar el proveedor de identidad: {}", e).into());
        }
    }
    refresh_user(services.auth, &name, &photo);
    Ok(())
}

#[component]
fn ProfileView(user: AuthUser, profile: Option<UserProfile>, services: Services) -> impl IntoView {
    let (initial_name, initial_photo) = initial_values(&user, profile.as_ref());
    let (name, set_name) = signal(initial_name);
    let (photo, set_photo) = signal(initial_photo);
    let (saving, set_saving) = signal(false);

    let uid = user.uid.clone();
    let provider = user
        .provider_ids
        .first()
        .map(|p| provider_display_name(p).to_string())
        .unwrap_or_else(|| provider_display_name("password").to_string());

    let on_submit = {
        let uid = uid.clone();
        move |ev: leptos::web_sys::SubmitEvent| {
            ev.prevent_default();
            let toasts = services.with_value(|s| s.toasts);
            let display_name = match validate_display_name(&name.get_untracked()) {
                Ok(name) => name,
                Err(message) => {
                    toasts.warning(message);
                    return;
                }
            };
            let photo_url = photo.get_untracked().trim().to_string();

            set_saving.set(true);
            let app = services.with_value(|s| s.clone());
            let uid = uid.clone();
            spawn_local(async move {
                match save(app, uid, display_name, photo_url).await {
                    Ok(()) => toasts.success("Perfil actualizado correctamente"),
                    Err(e) => {
                        web_sys::console::error_1(&format!("[Perfil] Error al actualizar perfil: {}", e).into());
                        toasts.error("Error al actualizar el perfil");
                    }
                }
                set_saving.set(false);
            });
        }
    };

    view! {
        <div class="max-w-3xl mx-auto">
            <PageHeader
                icon="bi-person"
                title="Mi Perfil"
                subtitle="Gestiona tu información personal y preferencias"
            />
            <form class="card bg-base-100 shadow-xl" on:submit=on_submit>
                <div class="card-body gap-4">
                    <div class="flex items-center gap-4">
                        <div class="avatar placeholder">
                            <div class="w-20 rounded-full bg-neutral text-neutral-content">
                                {move || {
                                    let url = photo.get();
                                    if url.trim().is_empty() {
                                        view! { <i class="bi bi-person-circle text-5xl"></i> }.into_any()
                                    } else {
                                        view! { <img src=url alt="Avatar" /> }.into_any()
                                    }
                                }}
                            </div>
                        </div>
                        <small class="text-base-content/60">"Tu avatar actual"</small>
                    </div>

                    <label class="form-control w-full">
                        <span class="label-text">"Nombre para mostrar"</span>
                        <input
                            type="text"
                            class="input input-bordered"
                            required
                            prop:value=name
                            on:input=move |ev| set_name.set(event_target_value(&ev))
                        />
                        <span class="label-text-alt">"Este nombre se mostrará en la aplicación"</span>
                    </label>

                    <div>
                        <span class="label-text">"Email"</span>
                        <p class="font-semibold">{user.email.clone()}</p>
                        <span class="label-text-alt">"El email no se puede modificar"</span>
                    </div>

                    <label class="form-control w-full">
                        <span class="label-text">"URL de foto de perfil"</span>
                        <input
                            type="url"
                            class="input input-bordered"
                            placeholder="https://ejemplo.com/foto.jpg"
                            prop:value=photo
                            on:input=move |ev| set_photo.set(event_target_value(&ev))
                        />
                    </label>

                    <div class="grid md:grid-cols-2 gap-2 text-sm">
                        <div>
                            <strong>"ID de usuario:"</strong>
                            <code class="block break-all">{uid}</code>
                        </div>
                        <div>
                            <strong>"Proveedor:"</strong>
                            <span class="badge badge-outline ml-2">{provider}</span>
                        </div>
                    </div>

                    <div class="card-actions justify-between">
                        <a href="#/" class="btn btn-ghost">
                            <i class="bi bi-arrow-left"></i>
                            "Volver"
                        </a>
                        <button type="submit" class="btn btn-primary" disabled=move || saving.get()>
                            {move || if saving.get() {
                                view! { <span class="loading loading-spinner"></span> "Guardando..." }.into_any()
                            } else {
                                view! { <i class="bi bi-check-lg"></i> "Guardar Cambios" }.into_any()
                            }}
                        </button>
                    </div>
                </div>
            </form>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> AuthUser {
        AuthUser {
            uid: "u1".into(),
            email: "ana@finca.co".into(),
            display_name: Some("ana".into()),
            photo_url: None,
            provider_ids: vec!["password".into()],
        }
    }

    #[test]
    fn stored_profile_wins_over_session() {
        let now = Utc::now();
        let profile = UserProfile {
            uid: "u1".into(),
            email: "ana@finca.co".into(),
            display_name: "Ana Gómez".into(),
            photo_url: String::new(),
            provider_ids: vec![],
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        let (name, photo) = initial_values(&user(), Some(&profile));
        assert_eq!(name, "Ana Gómez");
        assert_eq!(photo, "");
    }

    #[test]
    fn session_fills_missing_profile() {
        let (name, _) = initial_values(&user(), None);
        assert_eq!(name, "ana");
    }
}

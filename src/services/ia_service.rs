// src/services/ia_service.rs

use std::sync::Arc;

use handlebars::Handlebars;
use once_cell::sync::Lazy;
use serde_json::json;

use crate::{
    common::error::AppError,
    models::ia::{AnaliseIa, ResumoFinanceiro},
    services::{llm::LlmClient, relatorio_service::RelatorioService},
    views,
};

const SYSTEM_PROMPT: &str =
    "Você é um assistente de gestão financeira para empreiteiros. Seja objetivo e use os números fornecidos.";

// Prompt em texto puro: sem escape de HTML
static PROMPTS: Lazy<Handlebars<'static>> = Lazy::new(|| {
    let mut hb = Handlebars::new();
    hb.register_escape_fn(handlebars::no_escape);
    views::register_helpers(&mut hb);
    if let Err(e) = hb.register_template_string(
        "analise_financeira",
        include_str!("../../templates/prompts/analise_financeira.hbs"),
    ) {
        tracing::error!("Template de prompt inválido: {}", e);
    }
    hb
});

#[derive(Clone)]
pub struct IaService {
    relatorios: RelatorioService,
    llm: Option<Arc<dyn LlmClient>>,
}

impl IaService {
    pub fn new(relatorios: RelatorioService, llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self { relatorios, llm }
    }

    pub fn configurado(&self) -> bool {
        self.llm.is_some()
    }

    /// Números de todos os projetos + médias das taxas da equipe ativa.
    pub async fn resumo(&self) -> Result<ResumoFinanceiro, AppError> {
        let projetos = self.relatorios.lucratividade(None).await?;
        let taxas = self.relatorios.media_taxas().await?;

        let receita_total: f64 = projetos.iter().map(|p| p.receita).sum();
        let custo_total: f64 = projetos
            .iter()
            .map(|p| p.custo_gastos + p.custo_mao_de_obra)
            .sum();

        Ok(ResumoFinanceiro {
            projetos,
            taxas,
            receita_total,
            custo_total,
            lucro_total: receita_total - custo_total,
        })
    }

    pub fn montar_prompt(
        resumo: &ResumoFinanceiro,
        pergunta: Option<&str>,
    ) -> Result<String, AppError> {
        let ctx = json!({
            "projetos": resumo.projetos,
            "taxas": resumo.taxas,
            "receita_total": resumo.receita_total,
            "custo_total": resumo.custo_total,
            "lucro_total": resumo.lucro_total,
            "pergunta": pergunta,
        });
        Ok(PROMPTS.render("analise_financeira", &ctx)?)
    }

    /// Envia o resumo para o modelo e devolve o texto da resposta.
    pub async fn responder(
        &self,
        resumo: &ResumoFinanceiro,
        pergunta: Option<&str>,
    ) -> Result<String, AppError> {
        let llm = self.llm.as_ref().ok_or(AppError::LlmNotConfigured)?;
        let prompt = Self::montar_prompt(resumo, pergunta)?;

        tracing::info!("🤖 Análise de IA solicitada ({} projetos)", resumo.projetos.len());
        Ok(llm.complete(SYSTEM_PROMPT, &prompt).await?)
    }

    pub async fn analisar(&self, pergunta: Option<&str>) -> Result<AnaliseIa, AppError> {
        let resumo = self.resumo().await?;
        let resposta = self.responder(&resumo, pergunta).await?;
        Ok(AnaliseIa { resposta, resumo })
    }
}

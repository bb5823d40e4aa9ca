// src/services/document_service.rs

use genpdf::{elements, style, Alignment, Element};

use crate::{
    common::error::AppError,
    db::OrcamentoRepository,
    models::{
        orcamento::{ItemCategoria, OrcamentoItem},
        relatorio::{CustoCategoria, FolhaPagamento, LucratividadeProjeto},
    },
    views::{formatar_data, formatar_moeda, status_label},
};

/// Família de fonte procurada em `FONTS_DIR` (LiberationSans-Regular.ttf etc.)
pub const FONT_FAMILY: &str = "LiberationSans";

// =============================================================================
//  CSV
// =============================================================================

const SEPARADOR: char = ';';

/// Campo com separador, aspas ou quebra de linha vai entre aspas (aspas dobradas).
fn campo_csv(valor: &str) -> String {
    if valor.contains([SEPARADOR, '"', '\n', '\r']) {
        format!("\"{}\"", valor.replace('"', "\"\""))
    } else {
        valor.to_string()
    }
}

// Vírgula decimal, como o Excel em pt-BR espera
fn numero_csv(valor: f64) -> String {
    format!("{:.2}", valor).replace('.', ",")
}

fn linha_csv(campos: &[String]) -> String {
    let mut linha = campos
        .iter()
        .map(|c| campo_csv(c))
        .collect::<Vec<_>>()
        .join(&SEPARADOR.to_string());
    linha.push_str("\r\n");
    linha
}

fn cabecalho_csv(colunas: &[&str]) -> String {
    linha_csv(&colunas.iter().map(|c| c.to_string()).collect::<Vec<_>>())
}

pub fn csv_lucratividade(linhas: &[LucratividadeProjeto]) -> String {
    let mut out = cabecalho_csv(&[
        "projeto", "cliente", "status", "receita", "gastos", "mao_de_obra", "lucro", "margem_%",
    ]);
    for l in linhas {
        out.push_str(&linha_csv(&[
            l.projeto_nome.clone(),
            l.cliente_nome.clone().unwrap_or_default(),
            l.status.clone(),
            numero_csv(l.receita),
            numero_csv(l.custo_gastos),
            numero_csv(l.custo_mao_de_obra),
            numero_csv(l.lucro),
            numero_csv(l.margem),
        ]));
    }
    out
}

pub fn csv_custos(linhas: &[CustoCategoria]) -> String {
    let mut out = cabecalho_csv(&["categoria", "total", "percentual_%"]);
    for l in linhas {
        out.push_str(&linha_csv(&[
            l.categoria.clone(),
            numero_csv(l.total),
            numero_csv(l.percentual),
        ]));
    }
    out
}

pub fn csv_folha(folha: &FolhaPagamento) -> String {
    let mut out = cabecalho_csv(&[
        "funcionario", "funcao", "dias", "horas_extras", "bruto", "adiantamentos", "liquido",
    ]);
    for f in &folha.funcionarios {
        out.push_str(&linha_csv(&[
            f.funcionario_nome.clone(),
            f.funcao.clone().unwrap_or_default(),
            numero_csv(f.dias),
            numero_csv(f.horas_extras),
            numero_csv(f.bruto),
            numero_csv(f.adiantamentos),
            numero_csv(f.liquido),
        ]));
    }
    out.push_str(&linha_csv(&[
        "TOTAL".into(),
        String::new(),
        String::new(),
        String::new(),
        numero_csv(folha.total_bruto),
        numero_csv(folha.total_adiantamentos),
        numero_csv(folha.total_liquido),
    ]));
    out
}

// =============================================================================
//  PDF
// =============================================================================

/// Uma tabela do documento: pesos das colunas, cabeçalho e linhas já formatadas.
struct Tabela {
    titulo: Option<String>,
    pesos: Vec<usize>,
    cabecalho: Vec<&'static str>,
    linhas: Vec<Vec<String>>,
}

/// Conteúdo montado antes de ir para o genpdf (tudo `Send`, para o spawn_blocking).
struct Documento {
    titulo: String,
    subtitulos: Vec<String>,
    tabelas: Vec<Tabela>,
    totais: Vec<String>,
}

fn render_pdf(fonts_dir: &str, documento: Documento) -> Result<Vec<u8>, AppError> {
    let font_family = genpdf::fonts::from_files(fonts_dir, FONT_FAMILY, None).map_err(|_| {
        AppError::FontNotFound(format!("{} em {}", FONT_FAMILY, fonts_dir))
    })?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(documento.titulo.clone());
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    doc.push(
        elements::Paragraph::new(documento.titulo)
            .styled(style::Style::new().bold().with_font_size(16)),
    );
    for sub in documento.subtitulos {
        doc.push(elements::Paragraph::new(sub).styled(style::Style::new().with_font_size(10)));
    }
    doc.push(elements::Break::new(1.5));

    let style_bold = style::Style::new().bold();
    for tabela in documento.tabelas {
        if let Some(titulo) = tabela.titulo {
            doc.push(
                elements::Paragraph::new(titulo)
                    .styled(style::Style::new().bold().with_font_size(12)),
            );
            doc.push(elements::Break::new(0.5));
        }

        let mut table = elements::TableLayout::new(tabela.pesos);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let mut header = table.row();
        for coluna in tabela.cabecalho {
            header.push_element(elements::Paragraph::new(coluna).styled(style_bold));
        }
        header.push().map_err(|e| AppError::PdfError(e.to_string()))?;

        for linha in tabela.linhas {
            let mut row = table.row();
            for celula in linha {
                row.push_element(elements::Paragraph::new(celula));
            }
            row.push().map_err(|e| AppError::PdfError(e.to_string()))?;
        }

        doc.push(table);
        doc.push(elements::Break::new(1.5));
    }

    for total in documento.totais {
        let mut paragraph = elements::Paragraph::new(total);
        paragraph.set_alignment(Alignment::Right);
        doc.push(paragraph.styled(style::Style::new().bold().with_font_size(11)));
    }

    // Renderiza para Buffer (Memória)
    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| AppError::PdfError(e.to_string()))?;
    Ok(buffer)
}

fn itens_tabela(titulo: &str, itens: &[OrcamentoItem]) -> Tabela {
    Tabela {
        titulo: Some(titulo.to_string()),
        pesos: vec![5, 1, 2, 2],
        cabecalho: vec!["Descrição", "Qtd", "Unitário", "Subtotal"],
        linhas: itens
            .iter()
            .map(|i| {
                vec![
                    i.descricao.clone(),
                    format!("{}", i.quantidade),
                    formatar_moeda(i.valor_unitario),
                    formatar_moeda(i.subtotal),
                ]
            })
            .collect(),
    }
}

#[derive(Clone)]
pub struct DocumentService {
    orcamentos: OrcamentoRepository,
    fonts_dir: String,
}

impl DocumentService {
    pub fn new(orcamentos: OrcamentoRepository, fonts_dir: String) -> Self {
        Self { orcamentos, fonts_dir }
    }

    // Carregar fontes e montar o PDF é trabalho síncrono
    async fn gerar(&self, documento: Documento) -> Result<Vec<u8>, AppError> {
        let fonts_dir = self.fonts_dir.clone();
        tokio::task::spawn_blocking(move || render_pdf(&fonts_dir, documento))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de geração de PDF: {}", e))?
    }

    pub async fn pdf_orcamento(&self, id: i64) -> Result<Vec<u8>, AppError> {
        let detalhe = self
            .orcamentos
            .find_detalhe(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Orçamento".into()))?;
        let o = &detalhe.orcamento;

        let mut subtitulos = vec![
            format!("Cliente: {}", o.cliente_nome.clone().unwrap_or_default()),
            format!("Data: {}", formatar_data(&o.criado_em)),
        ];
        if let Some(projeto) = &o.projeto_nome {
            subtitulos.push(format!("Projeto: {}", projeto));
        }
        if let Some(validade) = &o.validade {
            subtitulos.push(format!("Válido até: {}", formatar_data(validade)));
        }
        subtitulos.push(format!("Descrição: {}", o.descricao));
        if let Some(obs) = &o.observacoes {
            subtitulos.push(format!("Observações: {}", obs));
        }

        let mut tabelas = Vec::new();
        if !detalhe.materiais.is_empty() {
            tabelas.push(itens_tabela("Materiais", &detalhe.materiais));
        }
        if !detalhe.mao_de_obra.is_empty() {
            tabelas.push(itens_tabela("Mão de obra", &detalhe.mao_de_obra));
        }

        let total_material = OrcamentoRepository::subtotal(&detalhe.materiais, ItemCategoria::Material);
        let total_mao_de_obra =
            OrcamentoRepository::subtotal(&detalhe.mao_de_obra, ItemCategoria::MaoDeObra);

        tracing::info!("📄 Gerando PDF do orçamento #{}", id);

        self.gerar(Documento {
            titulo: format!("ORÇAMENTO #{}", o.id),
            subtitulos,
            tabelas,
            totais: vec![
                format!("Materiais: {}", formatar_moeda(total_material)),
                format!("Mão de obra: {}", formatar_moeda(total_mao_de_obra)),
                format!("TOTAL GERAL: {}", formatar_moeda(total_material + total_mao_de_obra)),
            ],
        })
        .await
    }

    pub async fn pdf_lucratividade(
        &self,
        linhas: Vec<LucratividadeProjeto>,
    ) -> Result<Vec<u8>, AppError> {
        let receita: f64 = linhas.iter().map(|l| l.receita).sum();
        let lucro: f64 = linhas.iter().map(|l| l.lucro).sum();

        self.gerar(Documento {
            titulo: "Lucratividade por projeto".into(),
            subtitulos: vec![],
            tabelas: vec![Tabela {
                titulo: None,
                pesos: vec![4, 2, 2, 2, 2, 2, 1],
                cabecalho: vec!["Projeto", "Status", "Receita", "Gastos", "Mão de obra", "Lucro", "Margem"],
                linhas: linhas
                    .iter()
                    .map(|l| {
                        vec![
                            l.projeto_nome.clone(),
                            status_label(&l.status).to_string(),
                            formatar_moeda(l.receita),
                            formatar_moeda(l.custo_gastos),
                            formatar_moeda(l.custo_mao_de_obra),
                            formatar_moeda(l.lucro),
                            format!("{:.1}%", l.margem),
                        ]
                    })
                    .collect(),
            }],
            totais: vec![
                format!("Receita total: {}", formatar_moeda(receita)),
                format!("Lucro total: {}", formatar_moeda(lucro)),
            ],
        })
        .await
    }

    pub async fn pdf_custos(&self, linhas: Vec<CustoCategoria>) -> Result<Vec<u8>, AppError> {
        let total: f64 = linhas.iter().map(|l| l.total).sum();

        self.gerar(Documento {
            titulo: "Custos por categoria".into(),
            subtitulos: vec![],
            tabelas: vec![Tabela {
                titulo: None,
                pesos: vec![4, 2, 1],
                cabecalho: vec!["Categoria", "Total", "%"],
                linhas: linhas
                    .iter()
                    .map(|l| {
                        vec![
                            status_label(&l.categoria).to_string(),
                            formatar_moeda(l.total),
                            format!("{:.1}%", l.percentual),
                        ]
                    })
                    .collect(),
            }],
            totais: vec![format!("TOTAL: {}", formatar_moeda(total))],
        })
        .await
    }

    pub async fn pdf_folha(&self, folha: FolhaPagamento) -> Result<Vec<u8>, AppError> {
        self.gerar(Documento {
            titulo: "Folha de pagamento".into(),
            subtitulos: vec![format!(
                "Período: {} a {}",
                formatar_data(&folha.inicio),
                formatar_data(&folha.fim)
            )],
            tabelas: vec![Tabela {
                titulo: None,
                pesos: vec![4, 1, 1, 2, 2, 2],
                cabecalho: vec!["Funcionário", "Dias", "H. extras", "Bruto", "Adiant.", "Líquido"],
                linhas: folha
                    .funcionarios
                    .iter()
                    .map(|f| {
                        vec![
                            f.funcionario_nome.clone(),
                            format!("{}", f.dias),
                            format!("{}", f.horas_extras),
                            formatar_moeda(f.bruto),
                            formatar_moeda(f.adiantamentos),
                            formatar_moeda(f.liquido),
                        ]
                    })
                    .collect(),
            }],
            totais: vec![
                format!("Total bruto: {}", formatar_moeda(folha.total_bruto)),
                format!("Adiantamentos: {}", formatar_moeda(folha.total_adiantamentos)),
                format!("TOTAL A PAGAR: {}", formatar_moeda(folha.total_liquido)),
            ],
        })
        .await
    }
}

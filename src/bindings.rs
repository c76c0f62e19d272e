//! Contract interfaces for the portfolio protocol, Permit2 and the Thena
//! position manager. Declared inline because the workflows only touch a
//! narrow slice of each contract's surface.
//!
//! Field names and ordering follow the deployed contracts, including the
//! `_witelistedProtocolIds` misspelling, which is part of the ABI.

use alloy::sol;

sol! {
    /// Constructor payload for portfolio creation. Fees are basis points,
    /// amounts are 18-decimal base units.
    #[derive(Debug, PartialEq)]
    struct PortfolioCreationInitData {
        address _assetManagerTreasury;
        address[] _whitelistedTokens;
        uint256 _managementFee;
        uint256 _performanceFee;
        uint256 _entryFee;
        uint256 _exitFee;
        uint256 _initialPortfolioAmount;
        uint256 _minPortfolioTokenHoldingAmount;
        bool _public;
        bool _transferable;
        bool _transferableToPublic;
        bool _whitelistTokens;
        bytes32[] _witelistedProtocolIds;
        string _name;
        string _symbol;
    }

    /// Module addresses deployed for a portfolio, emitted in `PortfolioInfo`.
    #[derive(Debug, PartialEq)]
    struct PortfolioModules {
        address portfolio;
        address tokenExclusionManager;
        address rebalancing;
        address owner;
        address borrowManager;
        address assetManagementConfig;
        address feeModule;
        address vaultAddress;
        address gnosisModule;
    }

    #[derive(Debug, PartialEq)]
    struct PermitDetails {
        address token;
        uint160 amount;
        uint48 expiration;
        uint48 nonce;
    }

    #[derive(Debug, PartialEq)]
    struct PermitBatch {
        PermitDetails[] details;
        address spender;
        uint256 sigDeadline;
    }

    /// Flash-loan repayment parameters for `multiTokenWithdrawal`. The
    /// no-borrow path passes zeroed amounts and empty swap data.
    #[derive(Debug, PartialEq)]
    struct WithdrawRepayParams {
        address _factory;
        address _token0;
        address _token1;
        address _flashLoanToken;
        address _solverHandler;
        address _swapHandler;
        uint256 _bufferUnit;
        uint256[][] _flashLoanAmount;
        uint256[][] _poolFees;
        bytes[][] firstSwapData;
        bytes[][] secondSwapData;
        bool isDexRepayment;
    }

    #[derive(Debug, PartialEq)]
    struct PositionDepositParams {
        uint256 _amount0Desired;
        uint256 _amount1Desired;
        uint256 _amount0Min;
        uint256 _amount1Min;
        address _deployer;
    }

    #[derive(Debug, PartialEq)]
    struct RebalanceIntent {
        address[] _newTokens;
        address[] _sellTokens;
        uint256[] _sellAmounts;
        address _handler;
        bytes _callData;
    }

    interface IPortfolioFactory {
        event PortfolioInfo(
            PortfolioModules portfolioData,
            uint256 indexed portfolioId,
            string _name,
            string _symbol,
            address indexed _owner,
            address indexed _accessController,
            bool isPublicPortfolio
        );

        function createPortfolioNonCustodial(PortfolioCreationInitData initData) external;
    }

    interface IPortfolio {
        function getTokens() external view returns (address[] memory);

        function balanceOf(address account) external view returns (uint256);

        function vault() external view returns (address);

        function initToken(address[] calldata tokens) external;

        function multiTokenDeposit(
            uint256[] calldata depositAmounts,
            uint256 _minMintAmount,
            PermitBatch calldata _permit,
            bytes calldata _signature
        ) external;

        function multiTokenWithdrawal(
            uint256 _portfolioTokenAmount,
            WithdrawRepayParams calldata repayData
        ) external;
    }

    interface IAssetManagementConfig {
        function enableUniSwapV3Manager(bytes32 protocolId) external;

        function lastDeployedPositionManager() external view returns (address);
    }

    interface IPositionManager {
        function createNewWrapperPosition(
            address _token0,
            address _token1,
            string memory _name,
            string memory _symbol,
            int24 _tickLower,
            int24 _tickUpper
        ) external returns (address);

        function deployedPositionWrappers(uint256 index) external view returns (address);

        function initializePositionAndDeposit(
            address _dustReceiver,
            address _positionWrapper,
            PositionDepositParams memory params
        ) external;

        function decreaseLiquidity(
            address _positionWrapper,
            uint256 _withdrawalAmount,
            uint256 _amount0Min,
            uint256 _amount1Min,
            address _swapDeployer,
            address tokenIn,
            address tokenOut,
            uint256 amountIn,
            uint24 _fee
        ) external;
    }

    interface IRebalancing {
        function updateTokens(RebalanceIntent rebalanceData) external;
    }

    interface IPositionWrapper {
        function balanceOf(address account) external view returns (uint256);

        function token0() external view returns (address);

        function token1() external view returns (address);
    }

    interface IAllowanceTransfer {
        function allowance(
            address user,
            address token,
            address spender
        ) external view returns (uint160 amount, uint48 expiration, uint48 nonce);
    }

    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);

        function approve(address spender, uint256 amount) external returns (bool);
    }
}
